//! Event Publisher Port (Driven Port)
//!
//! Fire-and-forget sink for decisions, routing plans, child order results
//! and breaker transitions. Publishing never blocks and never fails the
//! caller; implementations drop events they cannot take.

use serde::{Deserialize, Serialize};

use crate::domain::consensus::ConsensusDecision;
use crate::domain::execution_tactics::value_objects::{
    AlgorithmKind, ExecutionOutcome, ExecutionPlan, SliceReport,
};
use crate::domain::routing::RoutingPlan;
use crate::resilience::BreakerTransition;

/// Event emitted by the trading core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingEvent {
    /// Consensus decision for one symbol.
    Decision(ConsensusDecision),
    /// Routing plan for an actionable decision.
    Routing(RoutingPlan),
    /// Execution plan built.
    PlanCreated(ExecutionPlan),
    /// Child order result.
    ChildOrder(SliceReport),
    /// Execution plan reached a terminal state.
    PlanFinished(ExecutionOutcome),
    /// Circuit breaker state change.
    BreakerTransition(BreakerTransition),
}

impl TradingEvent {
    /// Event kind label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decision(_) => "decision",
            Self::Routing(_) => "routing",
            Self::PlanCreated(_) => "plan_created",
            Self::ChildOrder(_) => "child_order",
            Self::PlanFinished(_) => "plan_finished",
            Self::BreakerTransition(_) => "breaker_transition",
        }
    }

    /// Algorithm for plan events.
    #[must_use]
    pub fn algorithm(&self) -> Option<AlgorithmKind> {
        match self {
            Self::PlanCreated(plan) => Some(plan.algorithm()),
            Self::PlanFinished(outcome) => Some(outcome.algorithm),
            _ => None,
        }
    }
}

/// Port for publishing trading events.
pub trait EventPublisherPort: Send + Sync {
    /// Publish one event without blocking.
    fn publish(&self, event: TradingEvent);
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl EventPublisherPort for NoOpEventPublisher {
    fn publish(&self, _event: TradingEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consensus::HoldReason;
    use crate::domain::shared::Symbol;

    #[test]
    fn no_op_publisher_accepts_events() {
        let publisher = NoOpEventPublisher;
        publisher.publish(TradingEvent::Decision(ConsensusDecision::hold(
            Symbol::new("AAPL"),
            HoldReason::NoOpinions,
            vec![],
        )));
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = TradingEvent::Decision(ConsensusDecision::hold(
            Symbol::new("AAPL"),
            HoldReason::NoOpinions,
            vec![],
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "DECISION");
        assert_eq!(event.kind(), "decision");
        assert_eq!(event.algorithm(), None);
    }
}
