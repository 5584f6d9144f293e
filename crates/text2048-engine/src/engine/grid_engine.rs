use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, EpisodeTerminatedError,
    core::{
        board::{Board, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE},
        moves::Move,
    },
};

use super::{
    game_state::GameState,
    game_stats::GameStats,
    tile_spawner::{SpawnedTile, TileSeed, TileSpawner},
};

/// Number of tiles placed by [`GridEngine::reset`].
pub const INITIAL_TILES: usize = 2;

/// Board size and spawn distribution of a [`GridEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub size: usize,
    pub four_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            four_probability: 0.1,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.size) {
            return Err(ConfigError::InvalidSize { size: self.size });
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::InvalidProbability {
                probability: self.four_probability,
            });
        }
        Ok(())
    }
}

/// Result of a single [`GridEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    state: GameState,
    score_delta: u64,
    merges: u32,
    changed: bool,
    spawned: Option<SpawnedTile>,
}

impl StepOutcome {
    /// The snapshot after the move and the spawn.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Sum of the tiles created by merges during this step.
    #[must_use]
    pub fn score_delta(&self) -> u64 {
        self.score_delta
    }

    #[must_use]
    pub fn merges(&self) -> u32 {
        self.merges
    }

    /// `false` for an ineffective move, in which case nothing was spawned.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    #[must_use]
    pub fn spawned(&self) -> Option<SpawnedTile> {
        self.spawned
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }
}

/// Owns the board of one episode and applies moves to it.
///
/// The engine is the only writer of its board. Randomness comes from a
/// [`TileSpawner`] seeded at construction; its stream continues across
/// [`reset`](Self::reset) so consecutive episodes differ while the whole
/// sequence stays reproducible.
#[derive(Debug, Clone)]
pub struct GridEngine {
    config: EngineConfig,
    spawner: TileSpawner,
    state: GameState,
    stats: GameStats,
}

impl GridEngine {
    /// Creates an engine and starts its first episode.
    pub fn new(config: EngineConfig, seed: TileSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.size).map_err(|_| ConfigError::InvalidSize {
            size: config.size,
        })?;
        let mut this = Self {
            config,
            spawner: TileSpawner::new(seed, config.four_probability),
            state: GameState::new(board, 0, 0),
            stats: GameStats::new(),
        };
        this.reset();
        Ok(this)
    }

    /// Creates an engine positioned on a given board, without spawning.
    ///
    /// Useful for replaying or testing a specific position.
    pub fn with_board(
        config: EngineConfig,
        seed: TileSeed,
        board: Board,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            size: board.size(),
            ..config
        };
        config.validate()?;
        let mut stats = GameStats::new();
        stats.observe_exponent(board.max_exponent());
        Ok(Self {
            config,
            spawner: TileSpawner::new(seed, config.four_probability),
            state: GameState::new(board, 0, 0),
            stats,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discards the current episode and starts a new one with two tiles.
    pub fn reset(&mut self) -> GameState {
        let mut board = *self.state.board();
        board.clear();
        for _ in 0..INITIAL_TILES {
            self.spawner.spawn(&mut board);
        }
        self.state = GameState::new(board, 0, 0);
        self.stats = GameStats::new();
        self.stats.observe_exponent(board.max_exponent());
        self.state
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.state.board()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Applies a move.
    ///
    /// A move that changes nothing is not an error: the outcome reports
    /// `changed == false`, a zero score delta and no spawned tile.
    pub fn step(&mut self, mv: Move) -> Result<StepOutcome, EpisodeTerminatedError> {
        if self.state.is_terminated() {
            return Err(EpisodeTerminatedError);
        }

        let shift = self.state.board().shifted(mv);
        let mut board = shift.board;
        let spawned = if shift.changed {
            self.spawner.spawn(&mut board)
        } else {
            None
        };

        let moves = self.state.moves() + u32::from(shift.changed);
        self.state = GameState::new(board, self.state.score() + shift.score, moves);
        self.stats
            .complete_move(shift.changed, shift.score, shift.merges, board.max_exponent());

        Ok(StepOutcome {
            state: self.state,
            score_delta: shift.score,
            merges: shift.merges,
            changed: shift.changed,
            spawned,
        })
    }
}
