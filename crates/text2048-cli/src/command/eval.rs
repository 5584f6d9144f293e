use std::path::{Path, PathBuf};

use anyhow::Context;
use text2048_agent::{
    evaluation::{self, EvaluationReport},
    policy::{GreedyPolicy, Policy, RandomPolicy},
};
use text2048_engine::{DEFAULT_BOARD_SIZE, EngineConfig, TileSeed};
use text2048_env::{EnvConfig, Environment as _, ObservationEncoding, Text2048Env};

use crate::{model::AiModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvalArg {
    /// Model file (JSON); a random policy plays when omitted
    #[arg(long)]
    pub(super) model: Option<PathBuf>,
    #[arg(long, default_value_t = 100)]
    pub(super) episodes: usize,
    #[arg(long, default_value_t = 0)]
    pub(super) seed: u64,
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    pub(super) size: usize,
    /// Observe log2 exponents instead of one-hot channels
    #[arg(long)]
    pub(super) no_one_hot: bool,
    /// Also write the report as JSON to this file (`-` writes it to stdout
    /// in place of the text report)
    #[arg(long)]
    pub(super) output: Option<PathBuf>,
}

pub(crate) fn env_config(size: usize, no_one_hot: bool) -> EnvConfig {
    let encoding = if no_one_hot {
        ObservationEncoding::Log2
    } else {
        ObservationEncoding::default()
    };
    EnvConfig {
        engine: EngineConfig::with_size(size),
        encoding,
        ..EnvConfig::default()
    }
}

/// Greedy policy of the model at `model`, or a seeded random policy.
pub(crate) fn load_policy(model: Option<&Path>, seed: u64) -> anyhow::Result<Box<dyn Policy>> {
    let policy: Box<dyn Policy> = match model {
        Some(path) => {
            let model = AiModel::open(path)?;
            Box::new(GreedyPolicy::new(Box::new(model.to_move_evaluator()?)))
        }
        None => Box::new(RandomPolicy::new(seed)),
    };
    Ok(policy)
}

fn evaluate(arg: &EvalArg) -> anyhow::Result<EvaluationReport> {
    let config = env_config(arg.size, arg.no_one_hot);
    let mut env =
        Text2048Env::new(config, TileSeed::from(arg.seed)).context("Invalid environment")?;
    tracing::debug!(encoding = ?config.encoding, len = env.observation_len(), "environment ready");
    let mut policy = load_policy(arg.model.as_deref(), arg.seed)?;
    let report = evaluation::evaluate(
        policy.as_mut(),
        &mut env,
        arg.episodes,
        arg.seed.wrapping_add(1),
    )
    .context("Evaluation failed")?;
    Ok(report)
}

pub(crate) fn run(arg: &EvalArg) -> anyhow::Result<()> {
    match &arg.model {
        Some(path) => eprintln!("Evaluating {}", path.display()),
        None => eprintln!("Evaluating a random policy"),
    }
    let report = evaluate(arg)?;

    let Some(path) = &arg.output else {
        println!("{report}");
        return Ok(());
    };
    let json_path = (path.as_os_str() != "-").then(|| path.clone());
    if json_path.is_some() {
        println!("{report}");
    }
    let mut output = Output::from_output_path(json_path)?;
    output.write_json(&report)?;
    eprintln!("Report saved to {}", output.display_path());
    Ok(())
}
