//! TWAP Tactic Configuration

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::SliceType;

/// Configuration for TWAP tactic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwapConfig {
    /// Total execution window (seconds).
    pub window_seconds: u64,
    /// Number of equal slices across the window.
    pub slice_count: u32,
    /// Order type per slice ("limit" or "market").
    pub slice_type: SliceType,
}

impl Default for TwapConfig {
    fn default() -> Self {
        Self {
            window_seconds: 600,
            slice_count: 10,
            slice_type: SliceType::Market,
        }
    }
}

impl TwapConfig {
    /// Create a new TWAP configuration.
    #[must_use]
    pub const fn new(window_seconds: u64, slice_count: u32, slice_type: SliceType) -> Self {
        Self {
            window_seconds,
            slice_count,
            slice_type,
        }
    }

    /// Total execution window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Time between slices (`W / N`).
    #[must_use]
    pub fn slice_interval(&self) -> Duration {
        if self.slice_count == 0 {
            return Duration::ZERO;
        }
        self.window() / self.slice_count
    }

    /// Calculate the quantity per slice, truncated to `dp` decimal places.
    #[must_use]
    pub fn calculate_slice_quantity(&self, total_quantity: Decimal, dp: u32) -> Decimal {
        if self.slice_count == 0 {
            return Decimal::ZERO;
        }
        (total_quantity / Decimal::from(self.slice_count))
            .round_dp_with_strategy(dp, RoundingStrategy::ToZero)
    }

    /// Calculate the execution schedule.
    ///
    /// Returns the offset from plan start at which each slice fires: slice `i`
    /// fires at `i × W / N`.
    #[must_use]
    pub fn calculate_schedule(&self) -> Vec<Duration> {
        (0..self.slice_count)
            .map(|i| self.window() * i / self.slice_count)
            .collect()
    }
}
