//! Iceberg Tactic Configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for ICEBERG tactic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcebergConfig {
    /// Visible quantity per peak.
    pub visible_size: Decimal,
    /// How long a peak may rest before its unfilled remainder is cancelled.
    pub peak_timeout_seconds: u64,
    /// Minimum time between peaks (milliseconds).
    pub min_interval_ms: u64,
    /// Consecutive zero-fill peaks after which the plan gives up.
    pub max_idle_peaks: u32,
}

impl Default for IcebergConfig {
    fn default() -> Self {
        Self {
            visible_size: Decimal::from(100),
            peak_timeout_seconds: 30,
            min_interval_ms: 500,
            max_idle_peaks: 3,
        }
    }
}

impl IcebergConfig {
    /// Create an iceberg configuration with the given visible size.
    #[must_use]
    pub fn with_visible_size(visible_size: Decimal) -> Self {
        Self {
            visible_size,
            ..Self::default()
        }
    }

    /// Peak resting timeout.
    #[must_use]
    pub const fn peak_timeout(&self) -> Duration {
        Duration::from_secs(self.peak_timeout_seconds)
    }

    /// Minimum gap between consecutive peaks.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iceberg_config_default() {
        let config = IcebergConfig::default();
        assert_eq!(config.visible_size, Decimal::from(100));
        assert_eq!(config.peak_timeout(), Duration::from_secs(30));
        assert_eq!(config.min_interval(), Duration::from_millis(500));
        assert_eq!(config.max_idle_peaks, 3);
    }

    #[test]
    fn iceberg_config_with_visible_size() {
        let config = IcebergConfig::with_visible_size(Decimal::from(5));
        assert_eq!(config.visible_size, Decimal::from(5));
        assert_eq!(config.max_idle_peaks, 3);
    }
}
