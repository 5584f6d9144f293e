//! Immutable training configuration.
//!
//! A [`TrainingConfig`] is read once (defaults, then an optional JSON
//! hyperparameter file, then command-line overrides) and passed by value to
//! the [`Trainer`](crate::trainer::Trainer). Missing JSON fields take their
//! default values.

use serde::{Deserialize, Serialize};
use text2048_engine::{ConfigError as EngineConfigError, EngineConfig};

/// Stage of the evolution schedule.
///
/// Early generations search a narrow weight range with strong mutation; later
/// generations widen the range and refine with weaker mutation.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

/// Genetic operator parameters that change with the phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseParams {
    pub max_weight: f32,
    pub mutation_sigma: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSchedule {
    /// First generation of the transition phase.
    pub transition_start: usize,
    /// First generation of the convergence phase.
    pub convergence_start: usize,
    pub exploration: PhaseParams,
    pub transition: PhaseParams,
    pub convergence: PhaseParams,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            transition_start: 30,
            convergence_start: 80,
            exploration: PhaseParams {
                max_weight: 0.5,
                mutation_sigma: 0.05,
            },
            transition: PhaseParams {
                max_weight: 0.8,
                mutation_sigma: 0.02,
            },
            convergence: PhaseParams {
                max_weight: 1.0,
                mutation_sigma: 0.01,
            },
        }
    }
}

impl PhaseSchedule {
    #[must_use]
    pub fn phase(&self, generation: usize) -> EvolutionPhase {
        if generation >= self.convergence_start {
            EvolutionPhase::Convergence
        } else if generation >= self.transition_start {
            EvolutionPhase::Transition
        } else {
            EvolutionPhase::Exploration
        }
    }

    #[must_use]
    pub fn params(&self, phase: EvolutionPhase) -> PhaseParams {
        match phase {
            EvolutionPhase::Exploration => self.exploration,
            EvolutionPhase::Transition => self.transition,
            EvolutionPhase::Convergence => self.convergence,
        }
    }
}

/// What an episode is judged on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessKind {
    #[default]
    Score,
    MaxTile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub engine: EngineConfig,
    pub fitness: FitnessKind,
    pub population_size: usize,
    pub generations: usize,
    pub episodes_per_individual: usize,
    pub move_limit: usize,
    pub elite_count: usize,
    pub tournament_size: usize,
    /// Probability of mutating each weight.
    pub mutation_rate: f32,
    pub blx_alpha: f32,
    pub phases: PhaseSchedule,
    /// Evaluate the best individual every n generations (`0` disables).
    pub eval_freq: usize,
    pub eval_episodes: usize,
    /// Write a checkpoint every n generations (`0` disables).
    pub save_freq: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            fitness: FitnessKind::default(),
            population_size: 30,
            generations: 100,
            episodes_per_individual: 3,
            move_limit: 3000,
            elite_count: 2,
            tournament_size: 2,
            mutation_rate: 0.3,
            blx_alpha: 0.2,
            phases: PhaseSchedule::default(),
            eval_freq: 10,
            eval_episodes: 20,
            save_freq: 10,
            seed: 0,
        }
    }
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum ConfigError {
    #[display("invalid engine configuration")]
    Engine(EngineConfigError),
    #[display("{field} must be positive")]
    #[from(ignore)]
    NotPositive { field: &'static str },
    #[display("elite count {elite_count} must be smaller than population size {population_size}")]
    #[from(ignore)]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("tournament size {tournament_size} exceeds population size {population_size}")]
    #[from(ignore)]
    TournamentTooLarge {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("{field} must be in 0.0..=1.0, got {value}")]
    #[from(ignore)]
    OutOfRange { field: &'static str, value: f32 },
    #[display("phase boundaries must satisfy transition_start <= convergence_start")]
    #[from(ignore)]
    PhaseOrder,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        for (field, value) in [
            ("population_size", self.population_size),
            ("generations", self.generations),
            ("episodes_per_individual", self.episodes_per_individual),
            ("move_limit", self.move_limit),
            ("tournament_size", self.tournament_size),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive { field });
            }
        }
        if self.eval_freq > 0 && self.eval_episodes == 0 {
            return Err(ConfigError::NotPositive {
                field: "eval_episodes",
            });
        }
        if self.elite_count >= self.population_size {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.tournament_size > self.population_size {
            return Err(ConfigError::TournamentTooLarge {
                tournament_size: self.tournament_size,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::OutOfRange {
                field: "mutation_rate",
                value: self.mutation_rate,
            });
        }
        if !(0.0..=1.0).contains(&self.blx_alpha) {
            return Err(ConfigError::OutOfRange {
                field: "blx_alpha",
                value: self.blx_alpha,
            });
        }
        for phase in [
            EvolutionPhase::Exploration,
            EvolutionPhase::Transition,
            EvolutionPhase::Convergence,
        ] {
            let params = self.phases.params(phase);
            if params.max_weight.is_nan() || params.max_weight <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "max_weight",
                });
            }
            if params.mutation_sigma.is_nan() || params.mutation_sigma <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "mutation_sigma",
                });
            }
        }
        if self.phases.transition_start > self.phases.convergence_start {
            return Err(ConfigError::PhaseOrder);
        }
        Ok(())
    }

    /// Checkpoint due after `generation` (0-based)?
    #[must_use]
    pub fn is_checkpoint(&self, generation: usize) -> bool {
        self.save_freq > 0 && (generation + 1) % self.save_freq == 0
    }

    /// Periodic evaluation due after `generation` (0-based)?
    #[must_use]
    pub fn is_evaluation(&self, generation: usize) -> bool {
        self.eval_freq > 0 && (generation + 1) % self.eval_freq == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TrainingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_phase_schedule() {
        let schedule = PhaseSchedule::default();
        assert_eq!(schedule.phase(0), EvolutionPhase::Exploration);
        assert_eq!(schedule.phase(29), EvolutionPhase::Exploration);
        assert_eq!(schedule.phase(30), EvolutionPhase::Transition);
        assert_eq!(schedule.phase(80), EvolutionPhase::Convergence);
        assert!(schedule.phase(1000).is_convergence());
        assert!(
            schedule.params(EvolutionPhase::Exploration).mutation_sigma
                > schedule.params(EvolutionPhase::Convergence).mutation_sigma
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"population_size": 8, "phases": {"transition_start": 2}}"#)
                .unwrap();
        assert_eq!(config.population_size, 8);
        assert_eq!(config.phases.transition_start, 2);
        assert_eq!(config.phases.convergence_start, 80);
        assert_eq!(config.generations, TrainingConfig::default().generations);
    }

    #[test]
    fn test_validation_errors() {
        let config = TrainingConfig {
            population_size: 0,
            ..TrainingConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "population_size"
            })
        );

        let config = TrainingConfig {
            elite_count: 30,
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TooManyElites { .. })));

        let config = TrainingConfig {
            mutation_rate: 1.5,
            ..TrainingConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "mutation_rate must be in 0.0..=1.0, got 1.5"
        );

        let config = TrainingConfig {
            engine: EngineConfig::with_size(1),
            ..TrainingConfig::default()
        };
        assert!(config.validate().unwrap_err().is_engine());
    }

    #[test]
    fn test_frequencies() {
        let config = TrainingConfig {
            save_freq: 5,
            eval_freq: 0,
            ..TrainingConfig::default()
        };
        assert!(!config.is_checkpoint(0));
        assert!(config.is_checkpoint(4));
        assert!(config.is_checkpoint(9));
        assert!(!config.is_evaluation(9));
    }
}
