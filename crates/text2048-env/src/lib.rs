//! Reset/step environment over the 2048 grid engine.
//!
//! [`Environment`] is the seam an external learner attaches to: actions are
//! plain indices (`0..4`, in [`Move::ALL`](text2048_engine::Move::ALL) order),
//! observations are flat `f32` vectors and rewards are scalars.
//! [`Text2048Env`] implements it over a [`GridEngine`](text2048_engine::GridEngine).

use arrayvec::ArrayVec;
use text2048_engine::{EpisodeTerminatedError, Move};

pub use self::{encoding::*, reward::*, text2048_env::*};

mod encoding;
mod reward;
mod text2048_env;

/// Flat observation vector handed to a learner.
pub type Observation = Vec<f32>;

/// Indices of the actions that change the current board.
pub type LegalActions = ArrayVec<usize, { Move::LEN }>;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EnvError {
    #[display("unknown action {action}, expected 0..{}", Move::LEN)]
    #[from(ignore)]
    UnknownAction { action: usize },
    #[display("episode already terminated, call reset first")]
    EpisodeTerminated(EpisodeTerminatedError),
}

/// Discrete-action environment with the usual reset/step contract.
pub trait Environment {
    /// Number of discrete actions.
    fn action_count(&self) -> usize;

    /// Length of every observation returned by [`reset`](Self::reset) and
    /// [`step`](Self::step).
    fn observation_len(&self) -> usize;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Observation;

    /// Applies an action to the current episode.
    fn step(&mut self, action: usize) -> Result<Transition, EnvError>;

    /// Actions that would change the current state.
    fn legal_actions(&self) -> LegalActions;
}
