pub use self::{board::*, moves::*};

pub(crate) mod board;
pub(crate) mod moves;
