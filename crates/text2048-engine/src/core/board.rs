use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{BoardError, core::moves::Move};

pub const MIN_BOARD_SIZE: usize = 2;
pub const MAX_BOARD_SIZE: usize = 8;
pub const DEFAULT_BOARD_SIZE: usize = 4;

const MAX_CELLS: usize = MAX_BOARD_SIZE * MAX_BOARD_SIZE;

/// Largest exponent whose tile value still fits in a `u64`.
///
/// Two tiles at this exponent never merge.
pub const MAX_EXPONENT: u8 = 63;

/// Returns the tile value for a log2 exponent (`0` means empty).
#[inline]
#[must_use]
pub const fn tile_value(exponent: u8) -> u64 {
    if exponent == 0 { 0 } else { 1 << exponent }
}

/// Square grid of power-of-two tiles.
///
/// Cells are stored row-major as log2 exponents, with `0` for an empty cell,
/// so a cell holding `2048` stores `11`. The backing array is sized for the
/// largest supported board which keeps `Board` `Copy` regardless of its size.
///
/// `Board` itself never changes randomly: [`Board::shifted`] is the pure
/// slide/merge transition and tile spawning lives in
/// [`TileSpawner`](crate::TileSpawner).
///
/// # Example
///
/// ```
/// use text2048_engine::{Board, Move};
///
/// let board = Board::from_rows(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
/// let shift = board.shifted(Move::Left);
/// assert!(shift.changed);
/// assert_eq!(shift.score, 4);
/// assert_eq!(shift.board.value(0, 0), 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    size: u8,
    cells: [u8; MAX_CELLS],
}

/// Result of sliding a board in one direction, before any tile is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// The board after sliding and merging.
    pub board: Board,
    /// Sum of the values of the tiles created by merges.
    pub score: u64,
    /// Number of merges performed.
    pub merges: u32,
    /// Whether at least one cell changed.
    pub changed: bool,
}

impl Board {
    /// Creates an empty board of the given size.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize { size });
        }
        #[expect(clippy::cast_possible_truncation)]
        let size = size as u8;
        Ok(Self {
            size,
            cells: [0; MAX_CELLS],
        })
    }

    /// Builds a board from row-major tile values (`0` for an empty cell).
    ///
    /// The board size is inferred from the number of values, which must be a
    /// perfect square.
    pub fn from_values(values: &[u64]) -> Result<Self, BoardError> {
        let size = (MIN_BOARD_SIZE..=MAX_BOARD_SIZE)
            .find(|size| size * size == values.len())
            .ok_or(BoardError::NotSquare {
                count: values.len(),
            })?;
        let mut board = Self::new(size)?;
        for (index, &value) in values.iter().enumerate() {
            if value != 0 && (value < 2 || !value.is_power_of_two()) {
                return Err(BoardError::InvalidTile { index, value });
            }
            #[expect(clippy::cast_possible_truncation)]
            let exponent = if value == 0 { 0 } else { value.trailing_zeros() as u8 };
            board.cells[index] = exponent;
        }
        Ok(board)
    }

    /// Builds a board from rows of tile values.
    ///
    /// Every row must be as long as there are rows.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, BoardError>
    where
        R: AsRef<[u64]>,
    {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != size {
                return Err(BoardError::RowLengthMismatch {
                    row,
                    expected: size,
                    actual: cells.len(),
                });
            }
            values.extend_from_slice(cells);
        }
        Self::from_values(&values)
    }

    /// Builds a board from row-major log2 exponents (`0` for an empty cell).
    pub fn from_exponents(size: usize, exponents: &[u8]) -> Result<Self, BoardError> {
        let mut board = Self::new(size)?;
        if exponents.len() != size * size {
            return Err(BoardError::CellCountMismatch {
                expected: size * size,
                actual: exponents.len(),
            });
        }
        for (index, &exponent) in exponents.iter().enumerate() {
            if exponent > MAX_EXPONENT {
                return Err(BoardError::InvalidExponent { index, exponent });
            }
            board.cells[index] = exponent;
        }
        Ok(board)
    }

    #[must_use]
    pub fn size(&self) -> usize {
        usize::from(self.size)
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.size() * self.size()
    }

    /// Returns the log2 exponents of all cells in row-major order.
    #[must_use]
    pub fn log2_cells(&self) -> &[u8] {
        &self.cells[..self.cell_count()]
    }

    /// Returns the exponent stored at a row-major index.
    #[must_use]
    pub fn exponent_at(&self, index: usize) -> u8 {
        self.log2_cells()[index]
    }

    /// Returns the tile value at `(row, col)`, `0` if the cell is empty.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> u64 {
        tile_value(self.log2_cells()[row * self.size() + col])
    }

    /// Iterates over tile values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.log2_cells().iter().map(|&e| tile_value(e))
    }

    /// Iterates over rows of exponents.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.log2_cells().chunks_exact(self.size())
    }

    pub(crate) fn clear(&mut self) {
        self.cells = [0; MAX_CELLS];
    }

    pub(crate) fn set_exponent(&mut self, index: usize, exponent: u8) {
        debug_assert!(exponent <= MAX_EXPONENT);
        self.cells[index] = exponent;
    }

    /// Iterates over the row-major indices of empty cells.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.log2_cells()
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == 0)
            .map(|(i, _)| i)
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.log2_cells().iter().filter(|e| **e == 0).count()
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.cell_count() - self.empty_count()
    }

    /// Returns the largest exponent on the board (`0` for an empty board).
    #[must_use]
    pub fn max_exponent(&self) -> u8 {
        self.log2_cells().iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn max_tile(&self) -> u64 {
        tile_value(self.max_exponent())
    }

    /// Sum of all tile values.
    #[must_use]
    pub fn tile_sum(&self) -> u64 {
        self.values().sum()
    }

    /// Slides and merges every lane toward `mv` without spawning a tile.
    ///
    /// Each lane is scanned from the leading edge. A tile produced by a merge
    /// is locked for the rest of the scan, so `[2, 2, 2, 2]` becomes
    /// `[4, 4, 0, 0]` and not `[8, 0, 0, 0]`.
    #[must_use]
    pub fn shifted(&self, mv: Move) -> Shift {
        let size = self.size();
        let mut board = *self;
        let mut score = 0;
        let mut merges = 0;
        let mut lane = [0; MAX_BOARD_SIZE];

        for lane_index in 0..size {
            for (offset, slot) in lane[..size].iter_mut().enumerate() {
                *slot = self.cells[lane_cell(size, mv, lane_index, offset)];
            }
            let (lane_score, lane_merges) = slide_lane(&mut lane[..size]);
            score += lane_score;
            merges += lane_merges;
            for (offset, exponent) in lane[..size].iter().enumerate() {
                board.cells[lane_cell(size, mv, lane_index, offset)] = *exponent;
            }
        }

        Shift {
            board,
            score,
            merges,
            changed: board != *self,
        }
    }

    /// Returns `true` if sliding toward `mv` changes at least one cell.
    #[must_use]
    pub fn can_shift(&self, mv: Move) -> bool {
        self.shifted(mv).changed
    }

    /// Moves that change the board, in action index order.
    #[must_use]
    pub fn legal_moves(&self) -> ArrayVec<Move, { Move::LEN }> {
        Move::ALL
            .into_iter()
            .filter(|mv| self.can_shift(*mv))
            .collect()
    }

    /// Returns `true` when no move changes the board.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        Move::ALL.into_iter().all(|mv| !self.can_shift(mv))
    }
}

/// Maps the `offset`-th cell of a lane, counted from the leading edge of
/// `mv`, to its row-major index.
fn lane_cell(size: usize, mv: Move, lane: usize, offset: usize) -> usize {
    match mv {
        Move::Left => lane * size + offset,
        Move::Right => lane * size + (size - 1 - offset),
        Move::Up => offset * size + lane,
        Move::Down => (size - 1 - offset) * size + lane,
    }
}

/// Slides one lane toward index 0 and merges equal neighbours once.
///
/// Returns the merge score and the number of merges.
fn slide_lane(lane: &mut [u8]) -> (u64, u32) {
    let mut locked = [false; MAX_BOARD_SIZE];
    let mut write = 0;
    let mut score = 0;
    let mut merges = 0;

    for read in 0..lane.len() {
        let exponent = lane[read];
        if exponent == 0 {
            continue;
        }
        lane[read] = 0;

        if write > 0
            && !locked[write - 1]
            && lane[write - 1] == exponent
            && exponent < MAX_EXPONENT
        {
            lane[write - 1] = exponent + 1;
            locked[write - 1] = true;
            score += tile_value(exponent + 1);
            merges += 1;
        } else {
            lane[write] = exponent;
            write += 1;
        }
    }

    (score, merges)
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("exponents", &self.log2_cells())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().to_string().len().max(4);
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for (x, &exponent) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                if exponent == 0 {
                    write!(f, "{:>width$}", ".")?;
                } else {
                    write!(f, "{:>width$}", tile_value(exponent))?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: [[2,0,0,0],[0,4,0,0],...] (rows of tile values)
        let rows = self
            .rows()
            .map(|row| row.iter().map(|&e| tile_value(e)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<Vec<u64>>::deserialize(deserializer)?;
        Self::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[[u64; 4]]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_slide_left_merges_pair() {
        let b = board(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shifted(Move::Left);
        assert!(shift.changed);
        assert_eq!(shift.score, 4);
        assert_eq!(shift.merges, 1);
        assert_eq!(shift.board, board(&[[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn test_merge_once_per_step() {
        let b = board(&[[2, 2, 2, 2], [4, 4, 8, 0], [2, 2, 4, 0], [0; 4]]);
        let shift = b.shifted(Move::Left);
        assert_eq!(
            shift.board,
            board(&[[4, 4, 0, 0], [8, 8, 0, 0], [4, 4, 0, 0], [0; 4]])
        );
        assert_eq!(shift.score, 4 + 4 + 8 + 4);
        assert_eq!(shift.merges, 4);
    }

    #[test]
    fn test_leading_edge_merges_first() {
        // The two tiles nearest the leading edge merge, the third slides.
        let b = board(&[[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(
            b.shifted(Move::Left).board,
            board(&[[4, 2, 0, 0], [0; 4], [0; 4], [0; 4]])
        );
        assert_eq!(
            b.shifted(Move::Right).board,
            board(&[[0, 0, 2, 4], [0; 4], [0; 4], [0; 4]])
        );
    }

    #[test]
    fn test_vertical_moves() {
        let b = board(&[[2, 0, 0, 0], [2, 0, 0, 4], [4, 0, 0, 0], [4, 0, 0, 4]]);
        assert_eq!(
            b.shifted(Move::Up).board,
            board(&[[4, 0, 0, 8], [8, 0, 0, 0], [0; 4], [0; 4]])
        );
        assert_eq!(
            b.shifted(Move::Down).board,
            board(&[[0; 4], [0; 4], [4, 0, 0, 0], [8, 0, 0, 8]])
        );
    }

    #[test]
    fn test_ineffective_move() {
        let b = board(&[[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shifted(Move::Left);
        assert!(!shift.changed);
        assert_eq!(shift.score, 0);
        assert_eq!(shift.board, b);
        assert!(b.can_shift(Move::Right));
        assert!(b.can_shift(Move::Down));
        assert!(!b.can_shift(Move::Up));
        assert_eq!(
            b.legal_moves().as_slice(),
            &[Move::Down, Move::Right]
        );
    }

    #[test]
    fn test_full_board_without_pairs_is_terminal() {
        let b = board(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert!(b.is_terminal());
        for mv in Move::ALL {
            assert!(!b.can_shift(mv));
        }
        assert!(b.legal_moves().is_empty());
    }

    #[test]
    fn test_full_board_with_pair_is_not_terminal() {
        let b = board(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 8, 8],
        ]);
        assert!(!b.is_terminal());
        assert!(b.can_shift(Move::Left));
        assert!(b.can_shift(Move::Right));
        assert!(!b.can_shift(Move::Up));
    }

    #[test]
    fn test_terminal_matches_exhaustive_simulation_on_small_boards() {
        // Every 2x2 board with exponents in 0..=3.
        for code in 0..(4u32.pow(4)) {
            let exponents = (0..4)
                .map(|i| u8::try_from((code >> (2 * i)) & 3).unwrap())
                .collect::<Vec<_>>();
            let b = Board::from_exponents(2, &exponents).unwrap();
            let any_change = Move::ALL.into_iter().any(|mv| b.shifted(mv).board != b);
            assert_eq!(b.is_terminal(), !any_change, "{b:?}");
        }
    }

    #[test]
    fn test_from_values_rejects_invalid_tiles() {
        assert_eq!(
            Board::from_values(&[3, 0, 0, 0]),
            Err(BoardError::InvalidTile { index: 0, value: 3 })
        );
        assert_eq!(
            Board::from_values(&[0, 1, 0, 0]),
            Err(BoardError::InvalidTile { index: 1, value: 1 })
        );
        assert_eq!(
            Board::from_values(&[2, 2, 2]),
            Err(BoardError::NotSquare { count: 3 })
        );
        assert_eq!(
            Board::from_values(&[0; 10]).unwrap_err().to_string(),
            "10 cells do not form a square board of size 2..=8"
        );
        assert_eq!(Board::new(9), Err(BoardError::InvalidSize { size: 9 }));
        assert!(Board::from_rows(&[vec![2, 0], vec![0]]).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        // Nine cells in total, but not three rows of three.
        assert_eq!(
            Board::from_rows(&[vec![2, 0, 0, 0], vec![0], vec![0, 0, 0, 4]]),
            Err(BoardError::RowLengthMismatch {
                row: 0,
                expected: 3,
                actual: 4,
            })
        );
        assert_eq!(
            Board::from_rows(&[vec![2, 0], vec![0, 0, 0]]),
            Err(BoardError::RowLengthMismatch {
                row: 1,
                expected: 2,
                actual: 3,
            })
        );
        let err = serde_json::from_str::<Board>("[[2,0,0,0],[0],[0,0,0,4]]").unwrap_err();
        assert!(err.to_string().contains("row 0 has 4 cells"));
    }

    #[test]
    fn test_accessors() {
        let b = board(&[[2, 0, 0, 0], [0, 2048, 0, 0], [0; 4], [0, 0, 0, 4]]);
        assert_eq!(b.size(), 4);
        assert_eq!(b.tile_count(), 3);
        assert_eq!(b.empty_count(), 13);
        assert_eq!(b.max_exponent(), 11);
        assert_eq!(b.max_tile(), 2048);
        assert_eq!(b.tile_sum(), 2054);
        assert_eq!(b.value(1, 1), 2048);
        assert_eq!(b.exponent_at(15), 2);
        assert!(!b.empty_cells().any(|i| i == 0 || i == 5 || i == 15));
    }

    #[test]
    fn test_display() {
        let b = board(&[[2, 0, 0, 0], [0, 16, 0, 0], [0; 4], [0, 0, 0, 4]]);
        let text = b.to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "   2    .    .    .");
        assert_eq!(lines[1], "   .   16    .    .");
    }

    #[test]
    fn test_serialization_format() {
        let b = board(&[[2, 0, 0, 0], [0, 4, 0, 0], [0; 4], [0, 0, 0, 8]]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[[2,0,0,0],[0,4,0,0],[0,0,0,0],[0,0,0,8]]");
        let parsed: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, b);

        let err = serde_json::from_str::<Board>("[[3,0],[0,0]]").unwrap_err();
        assert!(err.to_string().contains("invalid tile value"));
    }
}
