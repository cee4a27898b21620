//! Memoized minimax search over bidding positions.

pub mod cache;
pub mod evaluator;
pub mod line;

pub use cache::{CacheStats, TranspositionCache};
pub use evaluator::{Evaluation, Evaluator, ScoredTransition};
pub use line::{LineStep, OptimalLine};
