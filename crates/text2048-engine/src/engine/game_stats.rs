use serde::{Deserialize, Serialize};

/// Per-episode statistics.
///
/// Unlike [`GameState`](crate::GameState), which only counts moves that
/// changed the board, the statistics also record ineffective moves and the
/// number of merges, which is what policies are judged on.
///
/// # Example
///
/// ```
/// use text2048_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_move(true, 8, 2, 3);
/// stats.complete_move(false, 0, 0, 3);
///
/// assert_eq!(stats.score(), 8);
/// assert_eq!(stats.moves(), 1);
/// assert_eq!(stats.ineffective_moves(), 1);
/// assert_eq!(stats.max_tile(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    moves: u32,
    ineffective_moves: u32,
    merges: u32,
    max_exponent: u8,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            moves: 0,
            ineffective_moves: 0,
            merges: 0,
            max_exponent: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Number of moves that changed the board.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub const fn ineffective_moves(&self) -> u32 {
        self.ineffective_moves
    }

    #[must_use]
    pub const fn merges(&self) -> u32 {
        self.merges
    }

    /// Log2 of the largest tile seen in the episode.
    #[must_use]
    pub const fn max_exponent(&self) -> u8 {
        self.max_exponent
    }

    #[must_use]
    pub const fn max_tile(&self) -> u64 {
        crate::core::board::tile_value(self.max_exponent)
    }

    /// Records the board's initial maximum tile after a reset.
    pub(crate) fn observe_exponent(&mut self, exponent: u8) {
        self.max_exponent = self.max_exponent.max(exponent);
    }

    /// Updates statistics after a move.
    ///
    /// `max_exponent` is the largest exponent on the board after the move.
    pub fn complete_move(&mut self, changed: bool, score_delta: u64, merges: u32, max_exponent: u8) {
        if changed {
            self.moves += 1;
        } else {
            self.ineffective_moves += 1;
        }
        self.score += score_delta;
        self.merges += merges;
        self.observe_exponent(max_exponent);
    }
}
