use super::state::{GameState, StateError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    pub mover_money: u32,
    pub opponent_money: u32,
    pub cards: Vec<u32>,
    /// `-1` while the round is open.
    #[serde(default = "open_bid")]
    pub bid: i64,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to decode state snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot describes an invalid state: {0}")]
    Invalid(#[from] StateError),
}

fn open_bid() -> i64 {
    -1
}

impl StateSnapshot {
    pub fn capture(state: &GameState) -> Self {
        StateSnapshot {
            mover_money: state.mover_money(),
            opponent_money: state.opponent_money(),
            cards: state.cards().as_slice().to_vec(),
            bid: state.bid().raw(),
        }
    }

    pub fn restore(self) -> Result<GameState, StateError> {
        GameState::from_raw(self.mover_money, self.opponent_money, self.cards, self.bid)
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> Result<GameState, SnapshotError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)?;
        Ok(snapshot.restore()?)
    }
}
