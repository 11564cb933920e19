//! Consensus Errors

use thiserror::Error;

use crate::domain::shared::AgentId;

/// Malformed opinion sets or weights.
///
/// The engine recovers these locally by deciding HOLD; `try_decide` exposes
/// them to callers that want to know.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecisionError {
    /// Confidence outside `[0, 1]` or not a number.
    #[error("Agent {agent} reported confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange {
        /// Offending agent.
        agent: AgentId,
        /// Reported confidence.
        confidence: f64,
    },

    /// Negative or non-finite agent weight.
    #[error("Agent {agent} has invalid weight {weight}")]
    InvalidWeight {
        /// Offending agent.
        agent: AgentId,
        /// Configured weight.
        weight: f64,
    },

    /// Every opinion carries zero weight.
    #[error("Total agent weight is zero")]
    ZeroTotalWeight,
}
