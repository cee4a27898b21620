use super::Points;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Point values of the cards still to be contested, in play order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardSequence {
    cards: Vec<u32>,
}

impl CardSequence {
    pub fn new(cards: Vec<u32>) -> Self {
        Self { cards }
    }

    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// `leader` followed by the remaining values in the given order.
    pub fn led_by(leader: u32, rest: &[u32]) -> Self {
        let mut cards = Vec::with_capacity(rest.len() + 1);
        cards.push(leader);
        cards.extend_from_slice(rest);
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.cards.iter()
    }

    /// The card currently at stake.
    pub fn next_card(&self) -> Option<u32> {
        self.cards.first().copied()
    }

    /// Everything after the card at stake.
    pub fn remainder(&self) -> CardSequence {
        Self {
            cards: self.cards.get(1..).map(<[u32]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn total(&self) -> Points {
        self.cards.iter().map(|&value| Points::from(value)).sum()
    }

    /// Smallest score that beats the other player when the total is odd.
    pub fn fair_share(&self) -> Points {
        let total = self.total();
        total - total / 2
    }
}

impl From<Vec<u32>> for CardSequence {
    fn from(cards: Vec<u32>) -> Self {
        Self::new(cards)
    }
}

impl<const N: usize> From<[u32; N]> for CardSequence {
    fn from(cards: [u32; N]) -> Self {
        Self::new(cards.to_vec())
    }
}

impl fmt::Display for CardSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (idx, value) in self.cards.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid card list '{input}': '{token}' is not a card value")]
pub struct ParseCardsError {
    pub input: String,
    pub token: String,
}

impl FromStr for CardSequence {
    type Err = ParseCardsError;

    /// Accepts `5,4,3`, `5 4 3` or `(5, 4, 3)`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let inner = value
            .trim()
            .trim_start_matches(['(', '['])
            .trim_end_matches([')', ']']);
        inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| ParseCardsError {
                    input: value.to_string(),
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CardSequence::new)
    }
}
