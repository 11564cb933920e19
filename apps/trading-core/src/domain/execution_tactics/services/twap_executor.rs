//! TWAP Executor Domain Service

use rust_decimal::Decimal;
use std::time::Duration;

use super::sizing::round_to_lot;
use crate::domain::execution_tactics::value_objects::{PlannedSlice, TwapConfig};

/// TWAP executor for time-weighted average price execution.
///
/// Splits a large order into equal-sized slices distributed evenly across a
/// time window. The last slice takes whatever rounding left over so the
/// slices always sum to the total.
#[derive(Debug, Clone)]
pub struct TwapExecutor {
    /// Total quantity to execute.
    total_qty: Decimal,
    /// Number of slices.
    num_slices: usize,
    /// Slices handed out so far.
    executed_slices: usize,
    /// Quantity per (non-final) slice.
    qty_per_slice: Decimal,
    /// Quantity handed out so far.
    allocated_qty: Decimal,
    /// Offset of each slice from plan start.
    schedule: Vec<Duration>,
    /// Limit price for limit slices.
    price: Decimal,
    /// Resting timeout for limit slices.
    resting_timeout: Duration,
    /// Configuration.
    config: TwapConfig,
}

impl TwapExecutor {
    /// Create a new TWAP executor.
    #[must_use]
    pub fn new(
        total_qty: Decimal,
        config: TwapConfig,
        lot_size: Option<Decimal>,
        price: Decimal,
        resting_timeout: Duration,
    ) -> Self {
        let num_slices = config.slice_count as usize;
        let qty_per_slice = round_to_lot(
            config.calculate_slice_quantity(total_qty, super::sizing::SIZE_DP),
            lot_size,
        );
        let schedule = config.calculate_schedule();

        Self {
            total_qty,
            num_slices,
            executed_slices: 0,
            qty_per_slice,
            allocated_qty: Decimal::ZERO,
            schedule,
            price,
            resting_timeout,
            config,
        }
    }

    /// Returns the next slice in time order, if any remain.
    #[must_use]
    pub fn next_slice(&mut self) -> Option<PlannedSlice> {
        if self.is_complete() {
            return None;
        }

        let index = self.executed_slices;
        let quantity = if index + 1 == self.num_slices {
            self.remaining_qty()
        } else {
            self.qty_per_slice.min(self.remaining_qty())
        };
        let offset = self.schedule.get(index).copied().unwrap_or_default();

        self.executed_slices += 1;
        self.allocated_qty += quantity;

        Some(
            self.config
                .slice_type
                .planned(index, quantity, offset, self.price, self.resting_timeout),
        )
    }

    /// Get the remaining quantity not yet allocated to a slice.
    #[must_use]
    pub fn remaining_qty(&self) -> Decimal {
        self.total_qty - self.allocated_qty
    }

    /// Check if every slice has been handed out.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.executed_slices >= self.num_slices
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &TwapConfig {
        &self.config
    }

    /// Get the quantity per slice.
    #[must_use]
    pub const fn qty_per_slice(&self) -> Decimal {
        self.qty_per_slice
    }

    /// Get the execution schedule.
    #[must_use]
    pub fn schedule(&self) -> &[Duration] {
        &self.schedule
    }
}

impl Iterator for TwapExecutor {
    type Item = PlannedSlice;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_slice()
    }
}
