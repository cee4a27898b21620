use super::Points;
use super::bid::BidLevel;
use super::state::{GameState, StateError};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    /// Decline to outbid and concede the card at stake.
    Forfeit,
    /// Commit a new bid level.
    Raise(u32),
}

impl Move {
    pub const fn raised_to(self) -> Option<u32> {
        match self {
            Move::Forfeit => None,
            Move::Raise(amount) => Some(amount),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Forfeit => f.write_str("forfeit"),
            Move::Raise(amount) => write!(f, "raise to {amount}"),
        }
    }
}

/// One legal move and the position it hands to the other player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub action: Move,
    /// Points credited to the mover of `next`.
    pub delta: Points,
    pub next: GameState,
}

impl GameState {
    /// Every legal move for the mover, forfeit first, then raises ascending.
    ///
    /// Terminal states have no moves. A standing bid larger than the money of
    /// the player who placed it cannot be paid on forfeit and is rejected.
    pub fn transitions(&self) -> Result<Vec<Transition>, StateError> {
        let Some(card) = self.cards().next_card() else {
            return Ok(Vec::new());
        };
        let stake = self.bid().stake();
        let bidder_after_forfeit = self.opponent_money().checked_sub(stake).ok_or(
            StateError::StakeExceedsOpponentMoney {
                stake,
                opponent_money: self.opponent_money(),
            },
        )?;

        let raises = self
            .bid()
            .minimum_raise()
            .map_or(1..=0, |low| low..=self.mover_money());
        let mut moves = Vec::with_capacity(1 + raises.clone().count());

        // The standing bid is paid out of the pool of the player who placed it.
        moves.push(Transition {
            action: Move::Forfeit,
            delta: Points::from(card),
            next: GameState::new(
                bidder_after_forfeit,
                self.mover_money(),
                self.cards().remainder(),
                BidLevel::Open,
            ),
        });

        for amount in raises {
            moves.push(Transition {
                action: Move::Raise(amount),
                delta: 0,
                next: GameState::new(
                    self.opponent_money(),
                    self.mover_money(),
                    self.cards().clone(),
                    BidLevel::Standing(amount),
                ),
            });
        }

        Ok(moves)
    }
}
