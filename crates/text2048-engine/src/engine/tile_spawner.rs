use std::{fmt, num::ParseIntError, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::board::Board;

/// Seed for deterministic tile spawning.
///
/// Two engines created with the same seed and fed the same moves produce the
/// same boards, which makes episodes reproducible for evaluation and demos.
///
/// Serialized as a 16-character hex string. Parsed from a decimal integer so
/// it can be given on the command line.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use text2048_engine::TileSeed;
///
/// let seed: TileSeed = rand::rng().random();
/// let json = serde_json::to_string(&seed).unwrap();
/// assert_eq!(json.len(), 18);
///
/// assert_eq!("8".parse::<TileSeed>().unwrap(), TileSeed::from(8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
pub struct TileSeed(u64);

impl TileSeed {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TileSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TileSeed {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for TileSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for TileSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 16 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 16 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u64::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num))
    }
}

impl Distribution<TileSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TileSeed {
        TileSeed(rng.random())
    }
}

/// A tile placed on the board by [`TileSpawner::spawn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SpawnedTile {
    /// Row-major index of the cell.
    pub index: usize,
    /// Tile value, `2` or `4`.
    pub value: u64,
}

/// Places new tiles at random empty cells.
///
/// A spawned tile is `4` with probability `four_probability` and `2`
/// otherwise. The cell is chosen uniformly among the empty cells.
#[derive(Debug, Clone)]
pub struct TileSpawner {
    rng: Pcg32,
    four_probability: f64,
}

impl TileSpawner {
    #[must_use]
    pub fn new(seed: TileSeed, four_probability: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed.0),
            four_probability,
        }
    }

    /// Spawns one tile, or returns `None` if the board is full.
    pub fn spawn(&mut self, board: &mut Board) -> Option<SpawnedTile> {
        let empty = board.empty_cells().count();
        if empty == 0 {
            return None;
        }
        let nth = self.rng.random_range(0..empty);
        let index = board.empty_cells().nth(nth)?;
        let exponent = if self.rng.random_bool(self.four_probability) {
            2
        } else {
            1
        };
        board.set_exponent(index, exponent);
        Some(SpawnedTile {
            index,
            value: 1 << exponent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_serialization() {
        let seed = TileSeed::from(0x0123_4567_89ab_cdef);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"0123456789abcdef\"");
        let parsed: TileSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seed);

        let zero: TileSeed = serde_json::from_str("\"0000000000000000\"").unwrap();
        assert_eq!(zero.value(), 0);
    }

    #[test]
    fn test_seed_deserialize_rejects_bad_input() {
        assert!(serde_json::from_str::<TileSeed>("\"abc\"").is_err());
        assert!(serde_json::from_str::<TileSeed>("\"zzzzzzzzzzzzzzzz\"").is_err());
        assert!(serde_json::from_str::<TileSeed>("42").is_err());
    }

    #[test]
    fn test_seed_parse_decimal() {
        assert_eq!("42".parse::<TileSeed>().unwrap().value(), 42);
        assert!("-1".parse::<TileSeed>().is_err());
        assert_eq!(TileSeed::from(7).to_string(), "7");
    }

    #[test]
    fn test_spawn_fills_empty_cells_only() {
        let mut board = Board::new(2).unwrap();
        let mut spawner = TileSpawner::new(TileSeed::from(1), 0.1);
        let mut seen = Vec::new();
        for _ in 0..4 {
            let tile = spawner.spawn(&mut board).unwrap();
            assert!(tile.value == 2 || tile.value == 4);
            assert!(!seen.contains(&tile.index));
            seen.push(tile.index);
        }
        assert_eq!(board.empty_count(), 0);
        assert_eq!(spawner.spawn(&mut board), None);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let spawn_all = |seed| {
            let mut board = Board::new(4).unwrap();
            let mut spawner = TileSpawner::new(TileSeed::from(seed), 0.1);
            (0..16)
                .map(|_| spawner.spawn(&mut board).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(spawn_all(8), spawn_all(8));
        assert_ne!(spawn_all(8), spawn_all(9));
    }

    #[test]
    fn test_spawn_distribution_is_mostly_twos() {
        let mut spawner = TileSpawner::new(TileSeed::from(2048), 0.1);
        let trials = 20_000;
        let mut twos = 0;
        for _ in 0..trials {
            let mut board = Board::new(4).unwrap();
            if spawner.spawn(&mut board).unwrap().value == 2 {
                twos += 1;
            }
        }
        let ratio = f64::from(twos) / f64::from(trials);
        assert!((ratio - 0.9).abs() < 0.01, "ratio = {ratio}");
    }
}
