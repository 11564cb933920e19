//! Tactic Selector Domain Service

use rust_decimal::Decimal;

use crate::domain::execution_tactics::value_objects::{
    AlgorithmKind, TacticSelectionContext, TacticUrgency,
};

/// Chooses an execution algorithm from order size relative to volume and
/// urgency.
#[derive(Debug, Clone)]
pub struct TacticSelector {
    /// Below this fraction of average volume an order is small.
    small_order_pct: Decimal,
    /// At or above this fraction of average volume an order is large.
    large_order_pct: Decimal,
}

impl Default for TacticSelector {
    fn default() -> Self {
        Self {
            small_order_pct: Decimal::new(1, 2), // 0.01 (1%)
            large_order_pct: Decimal::new(5, 2), // 0.05 (5%)
        }
    }
}

impl TacticSelector {
    /// Create a selector with custom size thresholds.
    #[must_use]
    pub const fn new(small_order_pct: Decimal, large_order_pct: Decimal) -> Self {
        Self {
            small_order_pct,
            large_order_pct,
        }
    }

    /// Select the algorithm for the given context.
    #[must_use]
    pub fn select(&self, context: &TacticSelectionContext) -> AlgorithmKind {
        // A patient order with a target price waits for that price.
        if context.has_target_price && context.urgency == TacticUrgency::Low {
            return AlgorithmKind::Sniper;
        }

        match (context.size_pct_volume, context.urgency) {
            (size, _) if size < self.small_order_pct => AlgorithmKind::Market,
            (size, TacticUrgency::Low) if size < self.large_order_pct => AlgorithmKind::Twap,
            (size, TacticUrgency::High) if size < self.large_order_pct => AlgorithmKind::Iceberg,
            (_, TacticUrgency::Low) => AlgorithmKind::Vwap,
            (_, TacticUrgency::High) => AlgorithmKind::Iceberg,
        }
    }
}
