//! VWAP Tactic Configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AlgorithmKind, SliceType};
use crate::domain::execution_tactics::TacticError;

/// Allowed deviation of the volume curve sum from 1.0.
const CURVE_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Configuration for VWAP tactic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapConfig {
    /// Total execution window (seconds).
    pub window_seconds: u64,
    /// Historical volume distribution, one weight per time bucket.
    pub volume_curve: Vec<Decimal>,
    /// Order type per slice.
    pub slice_type: SliceType,
}

impl Default for VwapConfig {
    fn default() -> Self {
        // U-shaped intraday profile: heavy open and close, quiet midday.
        Self {
            window_seconds: 1_800,
            volume_curve: vec![
                dec!(0.15),
                dec!(0.10),
                dec!(0.08),
                dec!(0.07),
                dec!(0.06),
                dec!(0.06),
                dec!(0.07),
                dec!(0.09),
                dec!(0.12),
                dec!(0.20),
            ],
            slice_type: SliceType::Market,
        }
    }
}

impl VwapConfig {
    /// Create a new VWAP configuration.
    #[must_use]
    pub const fn new(window_seconds: u64, volume_curve: Vec<Decimal>, slice_type: SliceType) -> Self {
        Self {
            window_seconds,
            volume_curve,
            slice_type,
        }
    }

    /// Validate the curve and return it normalised to sum to exactly one.
    pub fn normalized_curve(&self) -> Result<Vec<Decimal>, TacticError> {
        if self.volume_curve.is_empty() {
            return Err(TacticError::invalid(
                AlgorithmKind::Vwap,
                "volume curve must not be empty",
            ));
        }
        if let Some(weight) = self.volume_curve.iter().find(|w| **w < Decimal::ZERO) {
            return Err(TacticError::invalid(
                AlgorithmKind::Vwap,
                format!("volume curve weight {weight} is negative"),
            ));
        }

        let sum: Decimal = self.volume_curve.iter().sum();
        if (sum - Decimal::ONE).abs() > CURVE_SUM_TOLERANCE {
            return Err(TacticError::invalid(
                AlgorithmKind::Vwap,
                format!("volume curve sums to {sum}, expected 1"),
            ));
        }

        Ok(self.volume_curve.iter().map(|w| *w / sum).collect())
    }

    /// Offset of each bucket from plan start (`i × W / B`).
    #[must_use]
    pub fn bucket_offsets(&self) -> Vec<Duration> {
        let Ok(buckets) = u32::try_from(self.volume_curve.len()) else {
            return Vec::new();
        };
        let window = Duration::from_secs(self.window_seconds);
        (0..buckets).map(|i| window * i / buckets).collect()
    }
}
