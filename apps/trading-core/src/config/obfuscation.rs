//! Obfuscation section.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Switches and limits that sit beside the top-level fuzz and jitter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObfuscationSettings {
    /// Disabled mode passes child orders through untouched.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum passive price offset for limit orders (basis points).
    #[serde(default = "default_max_price_offset_bps")]
    pub max_price_offset_bps: u32,
    /// Seed for reproducible perturbation.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ObfuscationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_price_offset_bps: default_max_price_offset_bps(),
            seed: None,
        }
    }
}

/// Submit jitter bounds (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    /// Lower bound.
    #[serde(default = "default_jitter_min")]
    pub min: u64,
    /// Upper bound.
    #[serde(default = "default_jitter_max")]
    pub max: u64,
}

impl Default for JitterRange {
    fn default() -> Self {
        Self {
            min: default_jitter_min(),
            max: default_jitter_max(),
        }
    }
}

const fn default_max_price_offset_bps() -> u32 {
    50
}

const fn default_jitter_min() -> u64 {
    100
}

const fn default_jitter_max() -> u64 {
    1_500
}
