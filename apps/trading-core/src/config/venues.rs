//! Venue configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::venues::PaperVenueConfig;

/// One trading venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Venue identifier used by routing and the circuit breaker.
    pub id: String,
    /// Per-venue call timeout; falls back to `venue_timeout_seconds`.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Paper fill behaviour.
    #[serde(default)]
    pub paper: PaperVenueConfig,
    /// Seed for reproducible paper fills.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl VenueConfig {
    /// Call timeout for this venue.
    #[must_use]
    pub const fn timeout(&self, default_seconds: u64) -> Duration {
        match self.timeout_seconds {
            Some(seconds) => Duration::from_secs(seconds),
            None => Duration::from_secs(default_seconds),
        }
    }
}

pub(super) fn default_venues() -> Vec<VenueConfig> {
    ["alpaca", "ibkr", "coinbase"]
        .into_iter()
        .map(|id| VenueConfig {
            id: id.to_string(),
            timeout_seconds: None,
            paper: PaperVenueConfig::default(),
            seed: None,
        })
        .collect()
}
