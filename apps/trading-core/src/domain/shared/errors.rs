//! Domain errors for the trading core.

use std::fmt;

/// Domain-level errors that can occur in business logic.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Entity type (e.g., "ExecutionPlan").
        entity: String,
        /// Current state.
        from: String,
        /// Attempted state.
        to: String,
    },

    /// Aggregate invariant violated.
    InvariantViolation {
        /// Aggregate type.
        aggregate: String,
        /// Invariant that was violated.
        invariant: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::InvalidStateTransition { entity, from, to } => {
                write!(f, "Invalid state transition for {entity}: {from} -> {to}")
            }
            Self::InvariantViolation {
                aggregate,
                invariant,
            } => {
                write!(f, "Invariant violation in {aggregate}: {invariant}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
