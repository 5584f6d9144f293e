use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    sync::{
        Once,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context;
use text2048_agent::board_feature::feature_by_id;
use text2048_training::{
    config::TrainingConfig,
    trainer::{GenerationReport, Trainer, TrainingObserver},
    training_log::{TrainingLogRecord, TrainingLogWriter},
};

use crate::{model::AiModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// JSON file with training hyperparameters (missing fields use defaults)
    #[arg(long)]
    pub(super) hyperparams_file: Option<PathBuf>,
    /// Model name; an existing model with this name is resumed
    #[arg(long, default_value = "text2048")]
    pub(super) model_name: String,
    /// Directory for the final model and checkpoints
    #[arg(long, default_value = "models")]
    pub(super) save_directory: PathBuf,
    /// Directory for the training log
    #[arg(long, default_value = "logs")]
    pub(super) log_directory: PathBuf,
    #[arg(long)]
    pub(super) seed: Option<u64>,
    #[arg(long)]
    pub(super) generations: Option<usize>,
    /// Write a checkpoint every n generations (non-positive disables)
    #[arg(long, allow_hyphen_values = true)]
    pub(super) save_freq: Option<i64>,
    /// Evaluate the best individual every n generations (non-positive disables)
    #[arg(long, allow_hyphen_values = true)]
    pub(super) eval_freq: Option<i64>,
    /// Episodes per periodic evaluation
    #[arg(long)]
    pub(super) eval_episodes: Option<usize>,
}

impl TrainArg {
    /// Defaults, then the hyperparameter file, then command-line flags.
    fn training_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config: TrainingConfig = match &self.hyperparams_file {
            Some(path) => util::read_json_file("hyperparameters", path)?,
            None => TrainingConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(save_freq) = self.save_freq {
            config.save_freq = frequency(save_freq);
        }
        if let Some(eval_freq) = self.eval_freq {
            config.eval_freq = frequency(eval_freq);
        }
        if let Some(eval_episodes) = self.eval_episodes {
            config.eval_episodes = eval_episodes;
        }
        Ok(config)
    }

    fn model_path(&self) -> PathBuf {
        self.save_directory.join(format!("{}.json", self.model_name))
    }

    fn checkpoint_path(&self, generations_done: usize) -> PathBuf {
        self.save_directory
            .join(format!("{}_{generations_done}.json", self.model_name))
    }

    fn log_path(&self) -> PathBuf {
        self.log_directory.join(format!("{}.jsonl", self.model_name))
    }
}

/// Maps a non-positive frequency to `0` (disabled).
fn frequency(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Set by the Ctrl-C handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Makes the first Ctrl-C stop training after the current generation. A
/// second one exits immediately.
fn install_interrupt_handler() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let result = ctrlc::set_handler(|| {
            if INTERRUPTED.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
            eprintln!("Interrupted: stopping after the current generation (Ctrl-C again to abort)");
        });
        if let Err(err) = result {
            tracing::warn!(%err, "failed to install the Ctrl-C handler");
        }
    });
}

/// Appends log records and writes checkpoints as generations finish.
struct TrainingRecorder<'a> {
    arg: &'a TrainArg,
    log: TrainingLogWriter<BufWriter<File>>,
    interrupted: &'a AtomicBool,
    generations_done: usize,
}

fn print_weight_stats(report: &GenerationReport) {
    eprintln!("Weights after generation #{}:", report.generation);
    eprintln!("  {:<20} {:>7} {:>7} {:>7}", "feature", "mean", "std", "best");
    for (id, summary) in &report.weight_summaries {
        let name = feature_by_id(id).map_or(id.as_str(), |f| f.name());
        let best = report.best_weights.get(id).copied().unwrap_or(0.0);
        eprintln!(
            "  {name:<20} {:>7.3} {:>7.3} {best:>7.3}",
            summary.mean, summary.std_dev
        );
    }
}

impl TrainingObserver for TrainingRecorder<'_> {
    type Error = anyhow::Error;

    fn should_stop(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn on_generation(&mut self, report: &GenerationReport) -> anyhow::Result<()> {
        self.generations_done += 1;
        print_weight_stats(report);
        self.log
            .write_record(&TrainingLogRecord::from_report(report))
            .with_context(|| {
                format!("Failed to write training log: {}", self.arg.log_path().display())
            })?;

        if let Some(evaluation) = &report.evaluation {
            eprintln!("Evaluation after generation #{}:", report.generation);
            eprintln!("{evaluation}");
        }

        if report.checkpoint {
            let path = self.arg.checkpoint_path(report.generation + 1);
            let model = AiModel::new(
                &self.arg.model_name,
                report.best.fitness(),
                report.best_weights.clone(),
            );
            model.save(&path)?;
            tracing::info!(path = %path.display(), "checkpoint saved");
        }
        Ok(())
    }
}

fn open_log(path: &Path) -> anyhow::Result<TrainingLogWriter<BufWriter<File>>> {
    if let Some(parent) = path.parent() {
        util::create_dir_all(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create training log: {}", path.display()))?;
    Ok(TrainingLogWriter::new(BufWriter::new(file)))
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    install_interrupt_handler();
    train(arg, &INTERRUPTED)
}

/// Trains until done or until `interrupted` is set, then saves the best model
/// found so far.
fn train(arg: &TrainArg, interrupted: &AtomicBool) -> anyhow::Result<()> {
    let config = arg.training_config()?;
    let trainer = Trainer::new(config).context("Invalid training configuration")?;

    let model_path = arg.model_path();
    let initial_weights = if model_path.exists() {
        let model = AiModel::open(&model_path)?;
        eprintln!("Resuming from {}", model_path.display());
        Some(model.weights_for(trainer.features())?)
    } else {
        None
    };

    util::create_dir_all(&arg.save_directory)?;
    let mut recorder = TrainingRecorder {
        arg,
        log: open_log(&arg.log_path())?,
        interrupted,
        generations_done: 0,
    };
    let best = trainer.run(initial_weights, &mut recorder)?;
    if recorder.generations_done == 0 {
        eprintln!("Training stopped before the first generation finished; model not saved");
        return Ok(());
    }
    if recorder.should_stop() {
        eprintln!(
            "Training stopped after {} generations; saving the best model so far",
            recorder.generations_done
        );
    }

    let model = AiModel::new(&arg.model_name, best.fitness(), trainer.weight_map(best.weights()));
    model.save(&model_path)?;

    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Path: {}", model_path.display());
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Weights: {} features", model.weights.len());
    eprintln!("  Log: {}", arg.log_path().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, io::BufReader};

    use tempfile::tempdir;
    use text2048_training::training_log::read_training_log;

    use super::*;

    fn arg(dir: &Path) -> TrainArg {
        TrainArg {
            hyperparams_file: None,
            model_name: "tiny".to_owned(),
            save_directory: dir.join("models"),
            log_directory: dir.join("logs"),
            seed: Some(3),
            generations: Some(2),
            save_freq: Some(1),
            eval_freq: Some(-1),
            eval_episodes: None,
        }
    }

    fn write_hyperparams(dir: &Path) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("hyperparams.json");
        fs::write(
            &path,
            r#"{"population_size": 4, "episodes_per_individual": 1, "move_limit": 30, "elite_count": 1}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_config_layers() {
        let dir = tempdir().unwrap();
        let arg = TrainArg {
            hyperparams_file: Some(write_hyperparams(dir.path())),
            ..arg(dir.path())
        };
        let config = arg.training_config().unwrap();
        assert_eq!(config.population_size, 4);
        assert_eq!(config.seed, 3);
        assert_eq!(config.generations, 2);
        assert_eq!(config.save_freq, 1);
        assert_eq!(config.eval_freq, 0);
        assert_eq!(config.eval_episodes, TrainingConfig::default().eval_episodes);
    }

    #[test]
    fn test_frequency() {
        assert_eq!(frequency(5), 5);
        assert_eq!(frequency(0), 0);
        assert_eq!(frequency(-3), 0);
    }

    #[test]
    fn test_train_writes_model_checkpoints_and_log() {
        let dir = tempdir().unwrap();
        let arg = TrainArg {
            hyperparams_file: Some(write_hyperparams(dir.path())),
            ..arg(dir.path())
        };
        let running = AtomicBool::new(false);
        train(&arg, &running).unwrap();

        let model = AiModel::open(arg.model_path()).unwrap();
        assert_eq!(model.name, "tiny");
        assert!(arg.checkpoint_path(1).exists());
        assert!(arg.checkpoint_path(2).exists());

        let log = File::open(arg.log_path()).unwrap();
        let records = read_training_log(BufReader::new(log)).unwrap();
        assert_eq!(records.len(), 2);
        assert!((records[1].best_fitness - model.final_fitness).abs() < f32::EPSILON);
        assert_eq!(records[1].weight_mean.len(), model.weights.len());

        // A second run resumes from the saved model.
        train(&arg, &running).unwrap();
        assert!(AiModel::open(arg.model_path()).unwrap().final_fitness >= 0.0);
    }

    #[test]
    fn test_interrupted_before_first_generation_saves_nothing() {
        let dir = tempdir().unwrap();
        let arg = TrainArg {
            hyperparams_file: Some(write_hyperparams(dir.path())),
            ..arg(dir.path())
        };
        let interrupted = AtomicBool::new(true);
        train(&arg, &interrupted).unwrap();

        assert!(!arg.model_path().exists());
        assert!(!arg.checkpoint_path(1).exists());
        let log = File::open(arg.log_path()).unwrap();
        assert!(read_training_log(BufReader::new(log)).unwrap().is_empty());
    }

    #[test]
    fn test_interrupt_keeps_best_so_far() {
        struct InterruptAfterFirst<'a>(TrainingRecorder<'a>, &'a AtomicBool);

        impl TrainingObserver for InterruptAfterFirst<'_> {
            type Error = anyhow::Error;

            fn should_stop(&self) -> bool {
                self.0.should_stop()
            }

            fn on_generation(&mut self, report: &GenerationReport) -> anyhow::Result<()> {
                self.0.on_generation(report)?;
                self.1.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let dir = tempdir().unwrap();
        let arg = TrainArg {
            hyperparams_file: Some(write_hyperparams(dir.path())),
            generations: Some(5),
            ..arg(dir.path())
        };
        let interrupted = AtomicBool::new(false);
        let trainer = Trainer::new(arg.training_config().unwrap()).unwrap();
        let mut observer = InterruptAfterFirst(
            TrainingRecorder {
                arg: &arg,
                log: open_log(&arg.log_path()).unwrap(),
                interrupted: &interrupted,
                generations_done: 0,
            },
            &interrupted,
        );
        let best = trainer.run(None, &mut observer).unwrap();
        assert_eq!(observer.0.generations_done, 1);
        assert!(arg.checkpoint_path(1).exists());
        assert!(!arg.checkpoint_path(2).exists());

        let checkpoint = AiModel::open(arg.checkpoint_path(1)).unwrap();
        assert!((checkpoint.final_fitness - best.fitness()).abs() < f32::EPSILON);
    }
}
