//! Expense splitting: normalization, fair shares, balance classification and settlement.
mod individual;
mod roster;
mod settlement;
mod share;
mod types;

pub use individual::*;
pub use roster::*;
pub use settlement::*;
pub use share::*;
pub use types::*;
