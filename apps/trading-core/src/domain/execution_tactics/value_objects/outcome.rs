//! Slice reports and execution outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AlgorithmKind, ExecutionStatus, OrderSide};
use crate::domain::shared::{ChildOrderId, PlanId, Symbol, VenueId};

/// Result of one child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SliceStatus {
    /// Fully filled.
    Filled,
    /// Some size filled; the remainder was cancelled or expired.
    PartiallyFilled,
    /// Accepted but nothing filled before the timeout.
    Unfilled,
    /// Every venue failed or rejected the order.
    Failed,
    /// Cancelled before it could fill.
    Cancelled,
}

impl fmt::Display for SliceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => write!(f, "FILLED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Unfilled => write!(f, "UNFILLED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// One child order result, streamed as the plan runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceReport {
    /// Owning plan.
    pub plan_id: PlanId,
    /// Planned slice (or iceberg peak) index.
    pub slice_index: usize,
    /// Child order identifier.
    pub child_id: ChildOrderId,
    /// Venue that accepted the order, if any.
    pub venue: Option<VenueId>,
    /// Size sent after perturbation and clamping.
    pub requested_size: Decimal,
    /// Size filled.
    pub filled_size: Decimal,
    /// Average fill price.
    pub avg_fill_price: Option<Decimal>,
    /// Result.
    pub status: SliceStatus,
    /// Dispatch attempts made for this slice (1 or 2).
    pub attempts: u32,
    /// Cumulative filled across the plan after this slice.
    pub cumulative_filled: Decimal,
    /// Parent size still unfilled after this slice.
    pub remaining: Decimal,
    /// Failure cause for failed slices.
    pub error: Option<String>,
    /// Report time.
    pub reported_at: DateTime<Utc>,
}

/// Unfilled parent size surfaced to the caller after retries ran out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialExecutionFailure {
    /// Plan that failed.
    pub plan_id: PlanId,
    /// Instrument.
    pub symbol: Symbol,
    /// Size filled before the failure.
    pub filled: Decimal,
    /// Size left unfilled.
    pub remaining: Decimal,
    /// What stopped the plan.
    pub cause: String,
}

/// Final result of running a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Plan identifier.
    pub plan_id: PlanId,
    /// Instrument.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Algorithm used.
    pub algorithm: AlgorithmKind,
    /// Terminal status.
    pub status: ExecutionStatus,
    /// Parent total.
    pub requested: Decimal,
    /// Total filled.
    pub filled: Decimal,
    /// Total unfilled.
    pub remaining: Decimal,
    /// Every slice report in dispatch order.
    pub slices: Vec<SliceReport>,
    /// Set when the plan stopped with unfilled size after a failure.
    pub failure: Option<PartialExecutionFailure>,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}

impl ExecutionOutcome {
    /// Whether the parent order was fully filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// Volume-weighted average fill price across all slices.
    #[must_use]
    pub fn average_fill_price(&self) -> Option<Decimal> {
        let (notional, size) = self
            .slices
            .iter()
            .filter_map(|s| s.avg_fill_price.map(|p| (p * s.filled_size, s.filled_size)))
            .fold((Decimal::ZERO, Decimal::ZERO), |(n, q), (dn, dq)| {
                (n + dn, q + dq)
            });
        if size.is_zero() {
            None
        } else {
            Some(notional / size)
        }
    }
}
