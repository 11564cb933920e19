//! Execution algorithm kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Available execution algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmKind {
    /// Single child order for the full size, dispatched immediately.
    Market,
    /// Equal slices spread evenly across a time window.
    Twap,
    /// Slices sized by a historical volume-distribution curve.
    Vwap,
    /// Fixed visible peaks, refreshed after each peak completes.
    Iceberg,
    /// One resting limit order at a target price until filled or expired.
    Sniper,
}

impl AlgorithmKind {
    /// Whether the algorithm rests limit orders on the book by default.
    #[must_use]
    pub const fn rests_orders(&self) -> bool {
        matches!(self, Self::Iceberg | Self::Sniper)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Twap => write!(f, "TWAP"),
            Self::Vwap => write!(f, "VWAP"),
            Self::Iceberg => write!(f, "ICEBERG"),
            Self::Sniper => write!(f, "SNIPER"),
        }
    }
}
