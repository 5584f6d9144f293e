use serde::{Deserialize, Serialize};
use text2048_engine::Board;

/// Default number of one-hot channels: empty plus tiles `2..=2^15`.
pub const DEFAULT_ONE_HOT_CHANNELS: usize = 16;

/// How a board is turned into an observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservationEncoding {
    /// One value per cell: the tile exponent (`0` for empty).
    Log2,
    /// `channels` values per cell, cell-major. Channel `k` is set when the
    /// cell's exponent is `k`; exponents past the last channel set the last one.
    OneHot { channels: usize },
}

impl Default for ObservationEncoding {
    fn default() -> Self {
        Self::OneHot {
            channels: DEFAULT_ONE_HOT_CHANNELS,
        }
    }
}

impl ObservationEncoding {
    /// Observation length for a board with `cell_count` cells.
    #[must_use]
    pub fn observation_len(&self, cell_count: usize) -> usize {
        match self {
            Self::Log2 => cell_count,
            Self::OneHot { channels } => cell_count * channels,
        }
    }

    #[must_use]
    pub fn encode(&self, board: &Board) -> Vec<f32> {
        let mut out = vec![0.0; self.observation_len(board.cell_count())];
        match *self {
            Self::Log2 => {
                for (slot, &exponent) in out.iter_mut().zip(board.log2_cells()) {
                    *slot = f32::from(exponent);
                }
            }
            Self::OneHot { channels } => {
                for (cell, &exponent) in board.log2_cells().iter().enumerate() {
                    let channel = usize::from(exponent).min(channels - 1);
                    out[cell * channels + channel] = 1.0;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log2_encoding() {
        let board = Board::from_rows(&[[2, 0], [8, 1024]]).unwrap();
        assert_eq!(ObservationEncoding::Log2.encode(&board), vec![1.0, 0.0, 3.0, 10.0]);
    }

    #[test]
    fn test_one_hot_encoding() {
        let board = Board::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let encoding = ObservationEncoding::OneHot { channels: 4 };
        let obs = encoding.encode(&board);
        assert_eq!(obs.len(), 16);
        assert_eq!(&obs[0..4], &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(&obs[4..8], &[1.0, 0.0, 0.0, 0.0]);
        assert!((obs.iter().sum::<f32>() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_one_hot_clamps_large_tiles() {
        let board = Board::from_rows(&[[64, 0], [0, 0]]).unwrap();
        let obs = ObservationEncoding::OneHot { channels: 4 }.encode(&board);
        assert_eq!(&obs[0..4], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_serde_format() {
        let json = serde_json::to_string(&ObservationEncoding::default()).unwrap();
        assert_eq!(json, r#"{"kind":"one_hot","channels":16}"#);
        let log2: ObservationEncoding = serde_json::from_str(r#"{"kind":"log2"}"#).unwrap();
        assert_eq!(log2, ObservationEncoding::Log2);
    }
}
