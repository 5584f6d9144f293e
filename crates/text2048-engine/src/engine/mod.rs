//! Episode management on top of the pure board transition.
//!
//! - [`GridEngine`] - owns the board of one episode, applies moves, spawns tiles
//! - [`GameState`] - immutable snapshot returned by reset and step
//! - [`GameStats`] - per-episode counters (score, moves, merges, max tile)
//! - [`TileSpawner`] and [`TileSeed`] - seeded placement of new tiles
//!
//! # Episode Flow
//!
//! 1. [`GridEngine::new`] validates the configuration and resets
//! 2. [`GridEngine::step`] slides, merges, and spawns one tile if the board changed
//! 3. The episode ends when no move changes the board; further steps fail
//!    with [`EpisodeTerminatedError`](crate::EpisodeTerminatedError)
//! 4. [`GridEngine::reset`] starts the next episode from the same random stream

pub use self::{game_state::*, game_stats::*, grid_engine::*, tile_spawner::*};

mod game_state;
mod game_stats;
mod grid_engine;
mod tile_spawner;
