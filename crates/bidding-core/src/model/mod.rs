pub mod bid;
pub mod cards;
pub mod snapshot;
pub mod state;
pub mod transition;

pub use bid::{BidLevel, ParseBidError};
pub use cards::{CardSequence, ParseCardsError};
pub use snapshot::{SnapshotError, StateSnapshot};
pub use state::{GameState, StateError};
pub use transition::{Move, Transition};

/// Point differential from the perspective of a state's mover.
pub type Points = i64;
