//! Sniper Tactic Configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for SNIPER tactic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperConfig {
    /// Target limit price; the parent's resting price when absent.
    pub target_price: Option<Decimal>,
    /// Time to wait for a fill before the order expires (seconds).
    pub expiry_seconds: u64,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            target_price: None,
            expiry_seconds: 300,
        }
    }
}

impl SniperConfig {
    /// Expiry as a duration.
    #[must_use]
    pub const fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_seconds)
    }
}
