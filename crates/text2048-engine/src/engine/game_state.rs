use serde::{Deserialize, Serialize};

use crate::core::board::Board;

/// Snapshot of an episode after a reset or a step.
///
/// Each call to [`GridEngine::step`](crate::GridEngine::step) supersedes the
/// previous snapshot. The score never decreases within an episode.
///
/// The terminal flag is serialized for readers of the JSON but recomputed
/// from the board when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StateFields")]
pub struct GameState {
    board: Board,
    score: u64,
    moves: u32,
    terminated: bool,
}

#[derive(Deserialize)]
struct StateFields {
    board: Board,
    score: u64,
    moves: u32,
}

impl From<StateFields> for GameState {
    fn from(fields: StateFields) -> Self {
        Self::new(fields.board, fields.score, fields.moves)
    }
}

impl GameState {
    pub(crate) fn new(board: Board, score: u64, moves: u32) -> Self {
        Self {
            board,
            score,
            moves,
            terminated: board.is_terminal(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Cumulative merge score of the episode.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of moves that changed the board.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Returns `true` when no move changes the board.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}
