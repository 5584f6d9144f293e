use serde::{Deserialize, Serialize};
use text2048_engine::{ConfigError, EngineConfig, GameState, GridEngine, Move, TileSeed};

use crate::{
    EnvError, Environment, LegalActions, Observation, encoding::ObservationEncoding,
    reward::RewardShaping,
};

/// Default reward for a move that leaves the board unchanged.
pub const DEFAULT_INVALID_MOVE_PENALTY: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub engine: EngineConfig,
    pub encoding: ObservationEncoding,
    pub reward: RewardShaping,
    /// Reward for an ineffective move. Negative so callers can detect such
    /// moves by the sign of the reward.
    pub invalid_move_penalty: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            encoding: ObservationEncoding::default(),
            reward: RewardShaping::default(),
            invalid_move_penalty: DEFAULT_INVALID_MOVE_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EnvConfigError {
    #[display("invalid engine configuration")]
    Engine(ConfigError),
    #[display("one-hot encoding needs at least one channel")]
    #[from(ignore)]
    NoChannels,
    #[display("invalid move penalty must be negative, got {penalty}")]
    #[from(ignore)]
    NonNegativePenalty { penalty: f32 },
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), EnvConfigError> {
        self.engine.validate()?;
        if let ObservationEncoding::OneHot { channels: 0 } = self.encoding {
            return Err(EnvConfigError::NoChannels);
        }
        if self.invalid_move_penalty >= 0.0 || self.invalid_move_penalty.is_nan() {
            return Err(EnvConfigError::NonNegativePenalty {
                penalty: self.invalid_move_penalty,
            });
        }
        Ok(())
    }
}

/// Episode bookkeeping attached to every [`Transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    pub score: u64,
    pub max_tile: u64,
    /// Moves that changed the board.
    pub moves: u32,
    /// Whether this step's move left the board unchanged.
    pub ineffective: bool,
}

impl EpisodeInfo {
    fn from_state(state: &GameState, ineffective: bool) -> Self {
        Self {
            score: state.score(),
            max_tile: state.board().max_tile(),
            moves: state.moves(),
            ineffective,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub info: EpisodeInfo,
}

/// 2048 environment backed by a [`GridEngine`].
///
/// # Example
///
/// ```
/// use text2048_engine::TileSeed;
/// use text2048_env::{EnvConfig, Environment as _, Text2048Env};
///
/// let mut env = Text2048Env::new(EnvConfig::default(), TileSeed::from(8)).unwrap();
/// let obs = env.reset();
/// assert_eq!(obs.len(), env.observation_len());
///
/// let action = env.legal_actions()[0];
/// let transition = env.step(action).unwrap();
/// assert!(transition.reward >= 0.0);
/// assert!(!transition.info.ineffective);
/// ```
#[derive(Debug, Clone)]
pub struct Text2048Env {
    config: EnvConfig,
    engine: GridEngine,
}

impl Text2048Env {
    pub fn new(config: EnvConfig, seed: TileSeed) -> Result<Self, EnvConfigError> {
        config.validate()?;
        let engine = GridEngine::new(config.engine, seed)?;
        Ok(Self { config, engine })
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The engine behind the environment, for rendering and inspection.
    #[must_use]
    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    /// Largest tile on the current board.
    #[must_use]
    pub fn max_tile(&self) -> u64 {
        self.engine.board().max_tile()
    }

    #[must_use]
    pub fn observation(&self) -> Observation {
        self.config.encoding.encode(self.engine.board())
    }
}

impl Environment for Text2048Env {
    fn action_count(&self) -> usize {
        Move::LEN
    }

    fn observation_len(&self) -> usize {
        self.config
            .encoding
            .observation_len(self.engine.board().cell_count())
    }

    fn reset(&mut self) -> Observation {
        self.engine.reset();
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        let mv = Move::from_index(action).ok_or(EnvError::UnknownAction { action })?;
        let outcome = self.engine.step(mv)?;
        let reward = if outcome.changed() {
            self.config.reward.reward(outcome.score_delta())
        } else {
            tracing::trace!(%mv, "ineffective move");
            self.config.invalid_move_penalty
        };
        Ok(Transition {
            observation: self.observation(),
            reward,
            terminated: outcome.is_terminated(),
            info: EpisodeInfo::from_state(outcome.state(), !outcome.changed()),
        })
    }

    fn legal_actions(&self) -> LegalActions {
        self.engine
            .board()
            .legal_moves()
            .into_iter()
            .map(Move::index)
            .collect()
    }
}
