//! Policy evaluation through the reset/step environment.
//!
//! Each step asks the policy for a move. When the move turns out to be
//! ineffective (the environment answers with a negative reward) a random
//! effective move is played instead, so a policy that gets stuck still
//! finishes its episodes.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use text2048_engine::{Move, tile_value};
use text2048_env::{EnvError, Environment as _, EpisodeInfo, Text2048Env, Transition};

use crate::{
    policy::{Policy, RandomPolicy},
    summary::Summary,
};

/// Plays one step with `policy`, retrying with `fallback` when the chosen
/// move does not change the board.
pub fn step_with_fallback<P>(
    policy: &mut P,
    fallback: &mut RandomPolicy,
    env: &mut Text2048Env,
) -> Result<Transition, EnvError>
where
    P: Policy + ?Sized,
{
    // A terminal board yields no move; stepping anyway reports the terminated episode.
    let action = policy
        .select_move(env.engine().board())
        .map_or(0, Move::index);
    let transition = env.step(action)?;
    if transition.reward < 0.0
        && let Some(mv) = fallback.select_move(env.engine().board())
    {
        tracing::trace!(%mv, "falling back to a random move");
        return env.step(mv.index());
    }
    Ok(transition)
}

/// Plays one full episode and returns the final episode info.
pub fn play_env_episode<P>(
    policy: &mut P,
    fallback: &mut RandomPolicy,
    env: &mut Text2048Env,
) -> Result<EpisodeInfo, EnvError>
where
    P: Policy + ?Sized,
{
    env.reset();
    loop {
        let transition = step_with_fallback(policy, fallback, env)?;
        if transition.terminated {
            return Ok(transition.info);
        }
    }
}

/// Plays `episodes` episodes and summarizes them.
pub fn evaluate<P>(
    policy: &mut P,
    env: &mut Text2048Env,
    episodes: usize,
    fallback_seed: u64,
) -> Result<EvaluationReport, EnvError>
where
    P: Policy + ?Sized,
{
    let mut fallback = RandomPolicy::new(fallback_seed);
    let mut infos = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        let info = play_env_episode(policy, &mut fallback, env)?;
        tracing::debug!(episode, score = info.score, max_tile = info.max_tile, "episode finished");
        infos.push(info);
    }
    Ok(EvaluationReport::from_episodes(&infos))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub episodes: usize,
    pub score: Summary,
    pub mean_moves: f32,
    /// Number of episodes per log2 of the largest tile reached.
    pub max_tile_histogram: BTreeMap<u8, usize>,
}

impl EvaluationReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_episodes(infos: &[EpisodeInfo]) -> Self {
        let score = Summary::new(infos.iter().map(|info| info.score as f32)).unwrap_or_default();
        let mean_moves = Summary::new(infos.iter().map(|info| info.moves as f32))
            .map_or(0.0, |s| s.mean);
        let mut max_tile_histogram = BTreeMap::new();
        for info in infos {
            #[expect(clippy::cast_possible_truncation)]
            let exponent = info.max_tile.checked_ilog2().unwrap_or(0) as u8;
            *max_tile_histogram.entry(exponent).or_default() += 1;
        }
        Self {
            episodes: infos.len(),
            score,
            mean_moves,
            max_tile_histogram,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Episodes: {}", self.episodes)?;
        writeln!(
            f,
            "Mean score: {:.1} (min {:.0}, max {:.0}, std {:.1})",
            self.score.mean, self.score.min, self.score.max, self.score.std_dev
        )?;
        writeln!(f, "Mean moves: {:.1}", self.mean_moves)?;
        write!(f, "Histogram of maximum tile achieved:")?;
        for (exponent, count) in &self.max_tile_histogram {
            write!(f, "\n{}: {count}", tile_value(*exponent))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use text2048_engine::{Board, TileSeed};
    use text2048_env::EnvConfig;

    use super::*;
    use crate::{
        board_feature::ALL_BOARD_FEATURES, move_evaluator::FeatureBasedMoveEvaluator,
        policy::GreedyPolicy,
    };

    /// Always proposes the same move, effective or not.
    struct FixedPolicy(Move);

    impl Policy for FixedPolicy {
        fn select_move(&mut self, board: &Board) -> Option<Move> {
            (!board.is_terminal()).then_some(self.0)
        }
    }

    fn env() -> Text2048Env {
        Text2048Env::new(EnvConfig::default(), TileSeed::from(8)).unwrap()
    }

    #[test]
    fn test_fallback_finishes_episodes() {
        let report = evaluate(&mut FixedPolicy(Move::Up), &mut env(), 3, 0).unwrap();
        assert_eq!(report.episodes, 3);
        assert_eq!(report.max_tile_histogram.values().sum::<usize>(), 3);
        assert!(report.mean_moves > 0.0);
    }

    #[test]
    fn test_greedy_beats_random_on_average() {
        let evaluator = FeatureBasedMoveEvaluator::new(
            ALL_BOARD_FEATURES.to_vec(),
            vec![0.3, 0.2, 0.1, 0.2, 0.1, 0.1],
        );
        let greedy = evaluate(&mut GreedyPolicy::new(Box::new(evaluator)), &mut env(), 20, 0).unwrap();
        let random = evaluate(&mut RandomPolicy::new(1), &mut env(), 20, 0).unwrap();
        assert!(greedy.score.mean > random.score.mean);
    }

    #[test]
    fn test_report_from_episodes() {
        let info = |score, max_tile| EpisodeInfo {
            score,
            max_tile,
            moves: 10,
            ineffective: false,
        };
        let report = EvaluationReport::from_episodes(&[info(100, 64), info(300, 128), info(200, 64)]);
        assert_eq!(report.episodes, 3);
        assert!((report.score.mean - 200.0).abs() < 1e-3);
        assert_eq!(report.max_tile_histogram[&6], 2);
        assert_eq!(report.max_tile_histogram[&7], 1);

        let text = report.to_string();
        assert!(text.contains("Episodes: 3"));
        assert!(text.ends_with("Histogram of maximum tile achieved:\n64: 2\n128: 1"));
    }

    #[test]
    fn test_empty_report() {
        let report = EvaluationReport::from_episodes(&[]);
        assert_eq!(report.episodes, 0);
        assert!(report.max_tile_histogram.is_empty());
        assert!(report.score.mean.abs() < f32::EPSILON);
    }
}
