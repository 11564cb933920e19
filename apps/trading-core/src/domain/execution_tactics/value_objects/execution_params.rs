//! Algorithm parameters for plan building.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{IcebergConfig, SniperConfig, TwapConfig, VwapConfig};

/// Parameters for every algorithm; `build_plan` reads the block matching the
/// chosen algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    /// TWAP parameters.
    pub twap: TwapConfig,
    /// VWAP parameters.
    pub vwap: VwapConfig,
    /// ICEBERG parameters.
    pub iceberg: IcebergConfig,
    /// SNIPER parameters.
    pub sniper: SniperConfig,
    /// Round slice sizes down to multiples of this lot.
    pub lot_size: Option<Decimal>,
    /// Resting timeout for TWAP/VWAP limit slices (seconds).
    pub fill_timeout_seconds: u64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            twap: TwapConfig::default(),
            vwap: VwapConfig::default(),
            iceberg: IcebergConfig::default(),
            sniper: SniperConfig::default(),
            lot_size: None,
            fill_timeout_seconds: 30,
        }
    }
}

impl ExecutionParams {
    /// Resting timeout for TWAP/VWAP limit slices.
    #[must_use]
    pub const fn fill_timeout(&self) -> Duration {
        Duration::from_secs(self.fill_timeout_seconds)
    }
}
