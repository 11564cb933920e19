//! Iceberg Executor Domain Service

use rust_decimal::Decimal;

use super::sizing::round_to_lot;
use crate::domain::execution_tactics::value_objects::{IcebergConfig, IcebergPeak};

/// Iceberg executor for hidden order execution.
///
/// Shows only a small visible portion of the total order, replenishing after
/// each peak completes. Gives up after `max_idle_peaks` consecutive peaks that
/// fill nothing.
#[derive(Debug, Clone)]
pub struct IcebergExecutor {
    /// Total hidden quantity.
    total_qty: Decimal,
    /// Visible "peak" size.
    display_qty: Decimal,
    /// Quantity filled so far.
    filled_qty: Decimal,
    /// Peak number.
    peak_number: usize,
    /// Consecutive peaks that filled nothing.
    idle_peaks: u32,
    /// Configuration.
    config: IcebergConfig,
}

impl IcebergExecutor {
    /// Create a new Iceberg executor.
    #[must_use]
    pub fn new(total_qty: Decimal, config: IcebergConfig, lot_size: Option<Decimal>) -> Self {
        let display_qty = round_to_lot(config.visible_size, lot_size);

        Self {
            total_qty,
            display_qty,
            filled_qty: Decimal::ZERO,
            peak_number: 0,
            idle_peaks: 0,
            config,
        }
    }

    /// Get the first peak to display.
    #[must_use]
    pub fn first_peak(&self) -> IcebergPeak {
        let quantity = self.display_qty.min(self.total_qty);
        IcebergPeak::new(quantity, 0)
    }

    /// Called when the current peak is done (filled or timed out) with the
    /// size it filled. Returns the next peak if any.
    #[must_use]
    pub fn on_fill(&mut self, filled: Decimal) -> Option<IcebergPeak> {
        self.filled_qty += filled;
        self.peak_number += 1;
        if filled > Decimal::ZERO {
            self.idle_peaks = 0;
        } else {
            self.idle_peaks += 1;
        }

        if self.is_complete() || self.is_stalled() {
            return None;
        }

        let remaining = self.remaining_qty();
        let next_display = self.display_qty.min(remaining);

        Some(IcebergPeak::new(next_display, self.peak_number))
    }

    /// Peak sizes if every peak fills completely: full peaks then the remainder.
    #[must_use]
    pub fn planned_peaks(&self) -> Vec<IcebergPeak> {
        if self.display_qty <= Decimal::ZERO {
            return Vec::new();
        }
        let mut shadow = self.clone();
        let mut peaks = vec![shadow.first_peak()];
        while let Some(peak) = shadow.on_fill(peaks[peaks.len() - 1].quantity) {
            peaks.push(peak);
        }
        peaks
    }

    /// Get the remaining quantity to execute.
    #[must_use]
    pub fn remaining_qty(&self) -> Decimal {
        self.total_qty - self.filled_qty
    }

    /// Check if execution is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining_qty() <= Decimal::ZERO
    }

    /// Whether too many consecutive peaks filled nothing.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        self.config.max_idle_peaks > 0 && self.idle_peaks >= self.config.max_idle_peaks
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &IcebergConfig {
        &self.config
    }

    /// Get the filled quantity.
    #[must_use]
    pub const fn filled_qty(&self) -> Decimal {
        self.filled_qty
    }

    /// Get the display quantity per peak.
    #[must_use]
    pub const fn display_qty(&self) -> Decimal {
        self.display_qty
    }
}
