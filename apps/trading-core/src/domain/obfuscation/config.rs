//! Obfuscation configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::shared::DomainError;

/// Perturbation bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObfuscationConfig {
    /// Disabled mode passes orders through untouched.
    pub enabled: bool,
    /// Relative size fuzz, the factor is drawn from `[1 - fuzz, 1 + fuzz]`.
    pub quantity_fuzz_range: f64,
    /// Minimum submit jitter in milliseconds.
    pub jitter_min_ms: u64,
    /// Maximum submit jitter in milliseconds.
    pub jitter_max_ms: u64,
    /// Maximum passive price offset in basis points.
    pub max_price_offset_bps: u32,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quantity_fuzz_range: 0.02,
            jitter_min_ms: 100,
            jitter_max_ms: 1500,
            max_price_offset_bps: 50,
        }
    }
}

impl ObfuscationConfig {
    /// Configuration that leaves orders untouched.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Minimum jitter.
    #[must_use]
    pub const fn jitter_min(&self) -> Duration {
        Duration::from_millis(self.jitter_min_ms)
    }

    /// Maximum jitter.
    #[must_use]
    pub const fn jitter_max(&self) -> Duration {
        Duration::from_millis(self.jitter_max_ms)
    }

    /// Validate the bounds.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..1.0).contains(&self.quantity_fuzz_range) {
            return Err(DomainError::InvalidValue {
                field: "quantity_fuzz_range".to_string(),
                message: format!("must be in [0, 1), got {}", self.quantity_fuzz_range),
            });
        }
        if self.jitter_min_ms > self.jitter_max_ms {
            return Err(DomainError::InvalidValue {
                field: "timing_jitter_ms".to_string(),
                message: format!(
                    "min {} exceeds max {}",
                    self.jitter_min_ms, self.jitter_max_ms
                ),
            });
        }
        if self.max_price_offset_bps > 10_000 {
            return Err(DomainError::InvalidValue {
                field: "max_price_offset_bps".to_string(),
                message: format!("must not exceed 10000, got {}", self.max_price_offset_bps),
            });
        }
        Ok(())
    }
}
