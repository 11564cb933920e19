//! Execution plan aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AlgorithmKind, IcebergConfig, ParentOrder, PlannedSlice};
use crate::domain::shared::{DomainError, PlanId};

/// Lifecycle of an execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Built, not yet started.
    Pending,
    /// Slices are being dispatched.
    Running,
    /// Parent order fully filled.
    Completed,
    /// Stopped with unfilled size after retries were exhausted.
    PartiallyFailed,
    /// Cancelled by the caller.
    Cancelled,
}

impl ExecutionStatus {
    /// Whether the plan can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::PartiallyFailed | Self::Cancelled
        )
    }

    const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Cancelled)
                | (
                    Self::Running,
                    Self::Completed | Self::PartiallyFailed | Self::Cancelled
                )
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::PartiallyFailed => write!(f, "PARTIALLY_FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A parent order, the algorithm chosen for it and its pre-perturbation
/// child-order schedule.
///
/// Planned slice sizes always sum to the parent total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    id: PlanId,
    order: ParentOrder,
    algorithm: AlgorithmKind,
    slices: Vec<PlannedSlice>,
    iceberg: Option<IcebergConfig>,
    lot_size: Option<Decimal>,
    status: ExecutionStatus,
    created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    /// Assemble a plan, checking that the slices cover the parent exactly.
    pub fn new(
        order: ParentOrder,
        algorithm: AlgorithmKind,
        slices: Vec<PlannedSlice>,
        iceberg: Option<IcebergConfig>,
        lot_size: Option<Decimal>,
    ) -> Result<Self, DomainError> {
        let planned: Decimal = slices.iter().map(|s| s.size).sum();
        if planned != order.total_size {
            return Err(DomainError::InvariantViolation {
                aggregate: "ExecutionPlan".to_string(),
                invariant: format!(
                    "slice sizes sum to {planned}, parent total is {}",
                    order.total_size
                ),
            });
        }
        if slices.iter().any(|s| s.size <= Decimal::ZERO) {
            return Err(DomainError::InvariantViolation {
                aggregate: "ExecutionPlan".to_string(),
                invariant: "every slice must have a positive size".to_string(),
            });
        }

        Ok(Self {
            id: PlanId::generate(),
            order,
            algorithm,
            slices,
            iceberg,
            lot_size,
            status: ExecutionStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Plan identifier.
    #[must_use]
    pub const fn id(&self) -> &PlanId {
        &self.id
    }

    /// Parent order.
    #[must_use]
    pub const fn order(&self) -> &ParentOrder {
        &self.order
    }

    /// Algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    /// Planned slices in dispatch order.
    #[must_use]
    pub fn slices(&self) -> &[PlannedSlice] {
        &self.slices
    }

    /// Iceberg refresh parameters (ICEBERG plans only).
    #[must_use]
    pub const fn iceberg(&self) -> Option<&IcebergConfig> {
        self.iceberg.as_ref()
    }

    /// Lot size used for rounding.
    #[must_use]
    pub const fn lot_size(&self) -> Option<Decimal> {
        self.lot_size
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of planned slice sizes.
    #[must_use]
    pub fn planned_total(&self) -> Decimal {
        self.slices.iter().map(|s| s.size).sum()
    }

    /// Move to a new status, rejecting transitions out of terminal states.
    pub fn transition_to(&mut self, next: ExecutionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                entity: "ExecutionPlan".to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
