use serde::{Deserialize, Serialize};

/// Direction in which all tiles slide.
///
/// The discriminant order (`Up`, `Down`, `Left`, `Right`) is also the action
/// index order exposed to learning agents.
///
/// # Example
///
/// ```
/// use text2048_engine::Move;
///
/// assert_eq!(Move::from_index(2), Some(Move::Left));
/// assert_eq!(Move::Left.index(), 2);
/// assert_eq!("left".parse::<Move>().unwrap(), Move::Left);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const LEN: usize = 4;
    pub const ALL: [Self; Self::LEN] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the action index of this move.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the move for an action index, or `None` if out of range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

}
