//! VWAP Executor Domain Service

use rust_decimal::Decimal;
use std::time::Duration;

use super::sizing::round_to_lot;
use crate::domain::execution_tactics::value_objects::{PlannedSlice, SliceType};

/// VWAP executor for volume-weighted average price execution.
///
/// Sizes one slice per bucket of a historical volume curve. Each bucket gets
/// `total × weight`, and the last bucket absorbs rounding.
#[derive(Debug, Clone)]
pub struct VwapExecutor {
    /// Total quantity to execute.
    total_qty: Decimal,
    /// Normalised bucket weights.
    curve: Vec<Decimal>,
    /// Bucket offsets from plan start.
    offsets: Vec<Duration>,
    /// Quantity handed out so far.
    allocated_qty: Decimal,
    /// Next bucket.
    bucket: usize,
    lot_size: Option<Decimal>,
    slice_type: SliceType,
    price: Decimal,
    resting_timeout: Duration,
}

impl VwapExecutor {
    /// Create a new VWAP executor over a normalised curve.
    #[must_use]
    pub fn new(
        total_qty: Decimal,
        curve: Vec<Decimal>,
        offsets: Vec<Duration>,
        lot_size: Option<Decimal>,
        slice_type: SliceType,
        price: Decimal,
        resting_timeout: Duration,
    ) -> Self {
        Self {
            total_qty,
            curve,
            offsets,
            allocated_qty: Decimal::ZERO,
            bucket: 0,
            lot_size,
            slice_type,
            price,
            resting_timeout,
        }
    }

    /// Returns the slice for the next bucket, if any remain.
    #[must_use]
    pub fn next_slice(&mut self) -> Option<PlannedSlice> {
        if self.is_complete() {
            return None;
        }

        let index = self.bucket;
        let quantity = if index + 1 == self.curve.len() {
            self.remaining_qty()
        } else {
            round_to_lot(self.total_qty * self.curve[index], self.lot_size)
                .min(self.remaining_qty())
        };
        let offset = self.offsets.get(index).copied().unwrap_or_default();

        self.bucket += 1;
        self.allocated_qty += quantity;

        Some(
            self.slice_type
                .planned(index, quantity, offset, self.price, self.resting_timeout),
        )
    }

    /// Get the remaining quantity not yet allocated to a bucket.
    #[must_use]
    pub fn remaining_qty(&self) -> Decimal {
        self.total_qty - self.allocated_qty
    }

    /// Check if every bucket has been handed out.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.bucket >= self.curve.len()
    }
}

impl Iterator for VwapExecutor {
    type Item = PlannedSlice;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn executor(total: Decimal, curve: Vec<Decimal>, lot: Option<Decimal>) -> VwapExecutor {
        let offsets = (0..curve.len() as u64).map(|i| Duration::from_secs(i * 60)).collect();
        VwapExecutor::new(
            total,
            curve,
            offsets,
            lot,
            SliceType::Market,
            dec!(100),
            Duration::from_secs(30),
        )
    }

    #[test]
    fn vwap_executor_sizes_by_weight() {
        let sizes: Vec<Decimal> = executor(dec!(1000), vec![dec!(0.2), dec!(0.5), dec!(0.3)], None)
            .map(|s| s.size)
            .collect();
        assert_eq!(sizes, vec![dec!(200), dec!(500), dec!(300)]);
    }

    #[test]
    fn vwap_executor_offsets_follow_buckets() {
        let offsets: Vec<Duration> = executor(dec!(10), vec![dec!(0.5), dec!(0.5)], None)
            .map(|s| s.offset)
            .collect();
        assert_eq!(offsets, vec![Duration::ZERO, Duration::from_secs(60)]);
    }

    #[test]
    fn vwap_executor_last_bucket_absorbs_lot_remainder() {
        let sizes: Vec<Decimal> =
            executor(dec!(95), vec![dec!(0.25), dec!(0.25), dec!(0.5)], Some(dec!(10)))
                .map(|s| s.size)
                .collect();
        assert_eq!(sizes, vec![dec!(20), dec!(20), dec!(55)]);
    }

    #[test]
    fn vwap_executor_remaining_qty() {
        let mut executor = executor(dec!(100), vec![dec!(0.4), dec!(0.6)], None);
        assert_eq!(executor.remaining_qty(), dec!(100));

        let _ = executor.next_slice();
        assert_eq!(executor.remaining_qty(), dec!(60));

        let _ = executor.next_slice();
        assert!(executor.is_complete());
        assert!(executor.next_slice().is_none());
    }
}
