//! Deterministic 2048-style grid engine.
//!
//! The crate is split the same way the game is played:
//!
//! - [`core`] holds the pure data: [`Board`] and [`Move`], and the slide/merge
//!   transition that maps one board to the next without randomness.
//! - [`engine`] owns a live episode: [`GridEngine`] applies moves, spawns new
//!   tiles from a seeded generator, tracks the score and reports when no move
//!   is left.
//!
//! # Example
//!
//! ```
//! use text2048_engine::{EngineConfig, GridEngine, Move, TileSeed};
//!
//! let mut engine = GridEngine::new(EngineConfig::default(), TileSeed::from(42)).unwrap();
//! assert_eq!(engine.board().tile_count(), 2);
//!
//! for mv in Move::ALL {
//!     if engine.state().is_terminated() {
//!         break;
//!     }
//!     let outcome = engine.step(mv).unwrap();
//!     assert!(outcome.state().score() >= outcome.score_delta());
//! }
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Returned by [`GridEngine::step`] once the episode has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("episode already terminated")]
pub struct EpisodeTerminatedError;

/// Errors raised while building a [`Board`] from external data.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("board size must be in {}..={}, got {size}", MIN_BOARD_SIZE, MAX_BOARD_SIZE)]
    InvalidSize { size: usize },
    #[display("expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[display("{count} cells do not form a square board of size {}..={}", MIN_BOARD_SIZE, MAX_BOARD_SIZE)]
    NotSquare { count: usize },
    #[display("row {row} has {actual} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("invalid tile value {value} at cell {index}")]
    InvalidTile { index: usize, value: u64 },
    #[display("invalid tile exponent {exponent} at cell {index}")]
    InvalidExponent { index: usize, exponent: u8 },
}

/// Errors raised by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board size must be in {}..={}, got {size}", MIN_BOARD_SIZE, MAX_BOARD_SIZE)]
    InvalidSize { size: usize },
    #[display("four-tile probability must be in 0.0..=1.0, got {probability}")]
    InvalidProbability { probability: f64 },
}
