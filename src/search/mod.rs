//! Fuzzy matching for free-text feed filtering.

mod matcher;
mod similarity;

pub use matcher::{DEFAULT_THRESHOLD, rank, score};
pub use similarity::similarity;
