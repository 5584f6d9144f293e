//! Episode evaluation: fitness functions for training.
//!
//! A policy plays an episode up to a move limit and the resulting
//! [`GameStats`] are turned into a single fitness value. Different fitness
//! functions reward different play:
//!
//! - [`ScoreFitness`]: the final merge score. Long episodes that keep merging
//!   score well.
//! - [`MaxTileFitness`]: the log2 of the largest tile, with the share of the
//!   move limit survived as a tie-breaker below `1.0`.
//!
//! [`DefaultEpisodeEvaluator`] plays every starting engine once and averages
//! the fitness. Starting engines are cloned, so every candidate sees the same
//! tile spawns for the same moves.

use std::fmt;

use text2048_engine::{GameStats, GridEngine};

use crate::policy::Policy;

/// Plays `engine`'s current episode with `policy` until it ends or
/// `move_limit` moves were made.
pub fn play_episode<P>(policy: &mut P, engine: &mut GridEngine, move_limit: usize) -> GameStats
where
    P: Policy + ?Sized,
{
    for _ in 0..move_limit {
        let Some(mv) = policy.select_move(engine.board()) else {
            break;
        };
        match engine.step(mv) {
            Ok(outcome) if outcome.is_terminated() => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
    *engine.stats()
}

/// Computes fitness from the statistics of one episode (higher is better).
pub trait EvaluateEpisodeStats: fmt::Debug + Send + Sync {
    fn evaluate_episode_stats(&self, stats: &GameStats, move_limit: usize) -> f32;
}

/// Plays and evaluates episodes for a policy.
pub trait EpisodeEvaluator: fmt::Debug + Send + Sync {
    fn play_and_evaluate_episode(&self, engine: &GridEngine, policy: &mut dyn Policy) -> f32;

    /// Plays one episode per starting engine and returns the mean fitness.
    fn play_and_evaluate_episodes(&self, engines: &[GridEngine], policy: &mut dyn Policy) -> f32;
}

#[derive(Debug)]
pub struct DefaultEpisodeEvaluator<E> {
    move_limit: usize,
    evaluator: E,
}

impl<E> DefaultEpisodeEvaluator<E> {
    pub fn new(move_limit: usize, evaluator: E) -> Self {
        Self {
            move_limit,
            evaluator,
        }
    }
}

impl<E> EpisodeEvaluator for DefaultEpisodeEvaluator<E>
where
    E: EvaluateEpisodeStats,
{
    fn play_and_evaluate_episode(&self, engine: &GridEngine, policy: &mut dyn Policy) -> f32 {
        let stats = play_episode(policy, &mut engine.clone(), self.move_limit);
        self.evaluator.evaluate_episode_stats(&stats, self.move_limit)
    }

    #[expect(clippy::cast_precision_loss)]
    fn play_and_evaluate_episodes(&self, engines: &[GridEngine], policy: &mut dyn Policy) -> f32 {
        if engines.is_empty() {
            return 0.0;
        }
        let mut total_fitness = 0.0;
        for engine in engines {
            total_fitness += self.play_and_evaluate_episode(engine, policy);
        }
        total_fitness / (engines.len() as f32)
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ScoreFitness {}

impl ScoreFitness {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl EvaluateEpisodeStats for ScoreFitness {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_episode_stats(&self, stats: &GameStats, _move_limit: usize) -> f32 {
        stats.score() as f32
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct MaxTileFitness {}

impl MaxTileFitness {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl EvaluateEpisodeStats for MaxTileFitness {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_episode_stats(&self, stats: &GameStats, move_limit: usize) -> f32 {
        let survival = if move_limit == 0 {
            0.0
        } else {
            (stats.moves() as f32 / move_limit as f32).min(0.999)
        };
        f32::from(stats.max_exponent()) + survival
    }
}
