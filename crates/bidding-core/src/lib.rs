#![deny(warnings)]
pub mod model;
pub mod search;

pub use model::{BidLevel, CardSequence, GameState, Move, Points, StateError, Transition};
pub use search::{Evaluator, LineStep, OptimalLine, ScoredTransition, TranspositionCache};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "bidding"
    }

    pub const fn codename() -> &'static str {
        "Minimax Auction"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
