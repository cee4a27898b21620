use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount committed by the most recent bidder in the current round.
///
/// `Open` sorts below every standing bid, so the derived ordering matches the
/// raw encoding where `-1` marks a fresh round.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BidLevel {
    #[default]
    Open,
    Standing(u32),
}

impl BidLevel {
    pub const OPEN_RAW: i64 = -1;

    /// Money the standing bidder loses if the other player forfeits.
    pub const fn stake(self) -> u32 {
        match self {
            BidLevel::Open => 0,
            BidLevel::Standing(amount) => amount,
        }
    }

    /// Smallest bid that outbids this level, if one is representable.
    pub const fn minimum_raise(self) -> Option<u32> {
        match self {
            BidLevel::Open => Some(0),
            BidLevel::Standing(amount) => amount.checked_add(1),
        }
    }

    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw == Self::OPEN_RAW {
            Some(BidLevel::Open)
        } else if raw >= 0 && raw <= u32::MAX as i64 {
            Some(BidLevel::Standing(raw as u32))
        } else {
            None
        }
    }

    pub const fn raw(self) -> i64 {
        match self {
            BidLevel::Open => Self::OPEN_RAW,
            BidLevel::Standing(amount) => amount as i64,
        }
    }
}

impl fmt::Display for BidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidLevel::Open => f.write_str("open"),
            BidLevel::Standing(amount) => write!(f, "{amount}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bid level '{0}' (expected 'open', -1 or a non-negative amount)")]
pub struct ParseBidError(pub String);

impl FromStr for BidLevel {
    type Err = ParseBidError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "open" | "none" => return Ok(BidLevel::Open),
            _ => {}
        }
        trimmed
            .parse::<i64>()
            .ok()
            .and_then(BidLevel::from_raw)
            .ok_or_else(|| ParseBidError(value.to_string()))
    }
}
