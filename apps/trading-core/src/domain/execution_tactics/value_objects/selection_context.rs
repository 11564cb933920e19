//! Inputs for automatic tactic selection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How quickly the order should be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TacticUrgency {
    /// Patient execution.
    Low,
    /// Complete quickly.
    High,
}

impl TacticUrgency {
    /// Urgency from a decision confidence and the high-urgency cutoff.
    #[must_use]
    pub fn from_confidence(confidence: f64, high_cutoff: f64) -> Self {
        if confidence >= high_cutoff {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Context for choosing an execution algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacticSelectionContext {
    /// Order size as a fraction of recent average bar volume.
    pub size_pct_volume: Decimal,
    /// Urgency.
    pub urgency: TacticUrgency,
    /// Whether the parent carries a target limit price.
    pub has_target_price: bool,
}

impl TacticSelectionContext {
    /// Create a new selection context.
    #[must_use]
    pub const fn new(size_pct_volume: Decimal, urgency: TacticUrgency, has_target_price: bool) -> Self {
        Self {
            size_pct_volume,
            urgency,
            has_target_price,
        }
    }

    /// Build a context from order size and average volume; zero volume counts
    /// as a very large order.
    #[must_use]
    pub fn from_volume(
        order_size: Decimal,
        average_volume: Decimal,
        urgency: TacticUrgency,
        has_target_price: bool,
    ) -> Self {
        let size_pct_volume = if average_volume > Decimal::ZERO {
            order_size / average_volume
        } else {
            Decimal::ONE
        };
        Self::new(size_pct_volume, urgency, has_target_price)
    }
}
