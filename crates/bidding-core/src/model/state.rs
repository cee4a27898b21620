use super::bid::BidLevel;
use super::cards::CardSequence;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position seen from the player about to act.
///
/// Field order defines the derived ordering, which is also used to break ties
/// between equally valued moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameState {
    mover_money: u32,
    opponent_money: u32,
    cards: CardSequence,
    #[serde(default)]
    bid: BidLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("card at position {index} has value 0; card values must be positive")]
    ZeroCard { index: usize },
    #[error("standing bid {stake} exceeds the {opponent_money} held by the player who placed it")]
    StakeExceedsOpponentMoney { stake: u32, opponent_money: u32 },
    #[error("raw bid level {0} is below the open-round sentinel -1")]
    InvalidRawBid(i64),
}

impl GameState {
    pub fn new(
        mover_money: u32,
        opponent_money: u32,
        cards: impl Into<CardSequence>,
        bid: BidLevel,
    ) -> Self {
        Self {
            mover_money,
            opponent_money,
            cards: cards.into(),
            bid,
        }
    }

    /// Start of a game: both players hold `money` and nobody has bid.
    pub fn opening(money: u32, cards: impl Into<CardSequence>) -> Self {
        Self::new(money, money, cards, BidLevel::Open)
    }

    /// Builds a state from the raw bid encoding (`-1` for an open round).
    pub fn from_raw(
        mover_money: u32,
        opponent_money: u32,
        cards: impl Into<CardSequence>,
        raw_bid: i64,
    ) -> Result<Self, StateError> {
        let bid = BidLevel::from_raw(raw_bid).ok_or(StateError::InvalidRawBid(raw_bid))?;
        let state = Self::new(mover_money, opponent_money, cards, bid);
        state.validate()?;
        Ok(state)
    }

    pub fn mover_money(&self) -> u32 {
        self.mover_money
    }

    pub fn opponent_money(&self) -> u32 {
        self.opponent_money
    }

    pub fn cards(&self) -> &CardSequence {
        &self.cards
    }

    pub fn bid(&self) -> BidLevel {
        self.bid
    }

    pub fn is_terminal(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn with_mover_money(&self, mover_money: u32) -> Self {
        Self {
            mover_money,
            ..self.clone()
        }
    }

    /// Checks the preconditions the search relies on.
    pub fn validate(&self) -> Result<(), StateError> {
        if let Some(index) = self.cards.iter().position(|&value| value == 0) {
            return Err(StateError::ZeroCard { index });
        }
        let stake = self.bid.stake();
        if stake > self.opponent_money {
            return Err(StateError::StakeExceedsOpponentMoney {
                stake,
                opponent_money: self.opponent_money,
            });
        }
        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} vs {}] cards {} bid {}",
            self.mover_money, self.opponent_money, self.cards, self.bid
        )
    }
}
