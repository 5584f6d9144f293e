//! Board features used to score a move.
//!
//! Every feature maps a [`MoveAnalysis`] to a value in \[0.0, 1.0\] where higher
//! is always better, so weights learned for one feature are comparable with
//! the others. Features read the board after the move unless noted.
//!
//! | id | measures |
//! |---|---|
//! | `empty_cells` | share of empty cells |
//! | `monotonicity` | how consistently rows and columns are ordered |
//! | `smoothness` | how close neighbouring tiles are in value |
//! | `corner_max_tile` | whether the largest tile sits in a corner |
//! | `merge_opportunities` | adjacent equal pairs available for the next move |
//! | `move_score` | merge score of the move relative to the tiles on the board |

use std::fmt;

use text2048_engine::Board;

use crate::move_analysis::MoveAnalysis;

pub trait BoardFeature: fmt::Debug + Send + Sync {
    /// Stable identifier, used as the key of model weight files.
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;

    /// Normalized feature value in \[0.0, 1.0\].
    #[must_use]
    fn compute(&self, analysis: &MoveAnalysis) -> f32;
}

pub const ALL_BOARD_FEATURES: &[&'static dyn BoardFeature] = &[
    &EmptyCells,
    &Monotonicity,
    &Smoothness,
    &CornerMaxTile,
    &MergeOpportunities,
    &MoveScore,
];

/// Looks up a feature in [`ALL_BOARD_FEATURES`] by id.
#[must_use]
pub fn feature_by_id(id: &str) -> Option<&'static dyn BoardFeature> {
    ALL_BOARD_FEATURES.iter().copied().find(|f| f.id() == id)
}

#[derive(Debug, Clone, Copy)]
pub struct EmptyCells;

impl BoardFeature for EmptyCells {
    fn id(&self) -> &'static str {
        "empty_cells"
    }
    fn name(&self) -> &'static str {
        "Empty Cells"
    }
    #[expect(clippy::cast_precision_loss)]
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let board = analysis.after();
        board.empty_count() as f32 / board.cell_count() as f32
    }
}

/// Ordering of every row and column.
///
/// For each line the exponent increases and decreases are summed separately;
/// the smaller of the two is the violation. The value is
/// `1 - 2 * Σ violation / Σ (increase + decrease)`, and `1.0` when every line
/// is flat.
#[derive(Debug, Clone, Copy)]
pub struct Monotonicity;

impl BoardFeature for Monotonicity {
    fn id(&self) -> &'static str {
        "monotonicity"
    }
    fn name(&self) -> &'static str {
        "Monotonicity"
    }
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let mut violation = 0u32;
        let mut variation = 0u32;
        for line in lines(analysis.after()) {
            let (mut inc, mut dec) = (0u32, 0u32);
            for pair in line.windows(2) {
                let (a, b) = (u32::from(pair[0]), u32::from(pair[1]));
                if b > a {
                    inc += b - a;
                } else {
                    dec += a - b;
                }
            }
            violation += inc.min(dec);
            variation += inc + dec;
        }
        if variation == 0 {
            return 1.0;
        }
        1.0 - 2.0 * ratio(violation, variation)
    }
}

/// Exponent difference between occupied neighbours, relative to the largest
/// exponent on the board.
#[derive(Debug, Clone, Copy)]
pub struct Smoothness;

impl BoardFeature for Smoothness {
    fn id(&self) -> &'static str {
        "smoothness"
    }
    fn name(&self) -> &'static str {
        "Smoothness"
    }
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let board = analysis.after();
        let mut diff = 0u32;
        let mut pairs = 0u32;
        for (a, b) in neighbour_pairs(board) {
            if a != 0 && b != 0 {
                diff += u32::from(a.abs_diff(b));
                pairs += 1;
            }
        }
        if pairs == 0 {
            return 1.0;
        }
        1.0 - ratio(diff, pairs * u32::from(board.max_exponent()))
    }
}

/// `1.0` when a largest tile is in a corner, `0.5` on an edge, else `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct CornerMaxTile;

impl BoardFeature for CornerMaxTile {
    fn id(&self) -> &'static str {
        "corner_max_tile"
    }
    fn name(&self) -> &'static str {
        "Max Tile in Corner"
    }
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let board = analysis.after();
        let max = board.max_exponent();
        if max == 0 {
            return 0.0;
        }
        let last = board.size() - 1;
        board
            .log2_cells()
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == max)
            .map(|(i, _)| {
                let (row, col) = (i / board.size(), i % board.size());
                let on_row_edge = row == 0 || row == last;
                let on_col_edge = col == 0 || col == last;
                match (on_row_edge, on_col_edge) {
                    (true, true) => 1.0,
                    (true, false) | (false, true) => 0.5,
                    (false, false) => 0.0,
                }
            })
            .fold(0.0, f32::max)
    }
}

/// Adjacent equal tiles, relative to the number of adjacent cell pairs.
#[derive(Debug, Clone, Copy)]
pub struct MergeOpportunities;

impl BoardFeature for MergeOpportunities {
    fn id(&self) -> &'static str {
        "merge_opportunities"
    }
    fn name(&self) -> &'static str {
        "Merge Opportunities"
    }
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let mut equal = 0u32;
        let mut total = 0u32;
        for (a, b) in neighbour_pairs(analysis.after()) {
            total += 1;
            if a != 0 && a == b {
                equal += 1;
            }
        }
        ratio(equal, total)
    }
}

/// Merge score of the move divided by the tile sum before the move.
///
/// A merged tile is worth the two tiles it consumed, so the score of one move
/// never exceeds the tile sum.
#[derive(Debug, Clone, Copy)]
pub struct MoveScore;

impl BoardFeature for MoveScore {
    fn id(&self) -> &'static str {
        "move_score"
    }
    fn name(&self) -> &'static str {
        "Move Score"
    }
    #[expect(clippy::cast_precision_loss)]
    fn compute(&self, analysis: &MoveAnalysis) -> f32 {
        let sum = analysis.before().tile_sum();
        if sum == 0 {
            return 0.0;
        }
        (analysis.score_delta() as f64 / sum as f64) as f32
    }
}

#[expect(clippy::cast_precision_loss)]
fn ratio(num: u32, den: u32) -> f32 {
    if den == 0 {
        0.0
    } else {
        (f64::from(num) / f64::from(den)) as f32
    }
}

/// Rows followed by columns, as exponent vectors.
fn lines(board: &Board) -> impl Iterator<Item = Vec<u8>> + '_ {
    let size = board.size();
    let cells = board.log2_cells();
    let rows = (0..size).map(move |r| cells[r * size..(r + 1) * size].to_vec());
    let cols = (0..size).map(move |c| (0..size).map(|r| cells[r * size + c]).collect());
    rows.chain(cols)
}

/// Exponents of every horizontally or vertically adjacent pair of cells.
fn neighbour_pairs(board: &Board) -> impl Iterator<Item = (u8, u8)> + '_ {
    let size = board.size();
    let cells = board.log2_cells();
    (0..size).flat_map(move |r| {
        (0..size).flat_map(move |c| {
            let here = cells[r * size + c];
            let right = (c + 1 < size).then(|| (here, cells[r * size + c + 1]));
            let down = (r + 1 < size).then(|| (here, cells[(r + 1) * size + c]));
            right.into_iter().chain(down)
        })
    })
}
