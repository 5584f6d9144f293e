//! The result of trying one move on a board, before any tile spawns.

use text2048_engine::{Board, Move, Shift};

#[derive(Debug, Clone, Copy)]
pub struct MoveAnalysis {
    mv: Move,
    before: Board,
    shift: Shift,
}

impl MoveAnalysis {
    #[must_use]
    pub fn from_board(before: &Board, mv: Move) -> Self {
        Self {
            mv,
            before: *before,
            shift: before.shifted(mv),
        }
    }

    #[must_use]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[must_use]
    pub fn before(&self) -> &Board {
        &self.before
    }

    /// Board after sliding and merging.
    #[must_use]
    pub fn after(&self) -> &Board {
        &self.shift.board
    }

    #[must_use]
    pub fn score_delta(&self) -> u64 {
        self.shift.score
    }

    #[must_use]
    pub fn merges(&self) -> u32 {
        self.shift.merges
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        self.shift.changed
    }
}
