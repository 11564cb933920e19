//! Execution Tactics Errors

use rust_decimal::Decimal;
use thiserror::Error;

use super::value_objects::AlgorithmKind;

/// Errors raised while building an execution plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TacticError {
    /// Invalid configuration provided.
    #[error("Invalid {algorithm} configuration: {message}")]
    InvalidConfiguration {
        /// Algorithm being planned.
        algorithm: AlgorithmKind,
        /// Error details.
        message: String,
    },

    /// Parent order size is not positive.
    #[error("Invalid parent order size: {size}")]
    InvalidQuantity {
        /// The invalid size.
        size: Decimal,
    },

    /// Planned slices do not add up to the parent order.
    #[error("Planned slices sum to {planned}, parent total is {total}")]
    PlanMismatch {
        /// Sum of planned slice sizes.
        planned: Decimal,
        /// Parent order total.
        total: Decimal,
    },
}

impl TacticError {
    pub(crate) fn invalid(algorithm: AlgorithmKind, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            algorithm,
            message: message.into(),
        }
    }
}
