//! Agent opinions and trade actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::execution_tactics::value_objects::OrderSide;
use crate::domain::shared::AgentId;

/// Directional action an agent (or the consensus) can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Open or add to a long position.
    Buy,
    /// Reduce or open a short position.
    Sell,
    /// Do nothing this cycle.
    Hold,
}

impl TradeAction {
    /// Order side for an actionable decision, `None` for HOLD.
    #[must_use]
    pub const fn side(&self) -> Option<OrderSide> {
        match self {
            Self::Buy => Some(OrderSide::Buy),
            Self::Sell => Some(OrderSide::Sell),
            Self::Hold => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// One agent's opinion for one cycle.
///
/// Created once per agent per cycle and never mutated. Confidence is expected
/// in `[0, 1]`; out-of-range values are rejected by the consensus engine, not
/// clamped here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOpinion {
    /// Agent that produced the opinion.
    pub agent_id: AgentId,
    /// Proposed action.
    pub action: TradeAction,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Optional human-readable rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl AgentOpinion {
    /// Create a new opinion.
    #[must_use]
    pub fn new(agent_id: impl Into<AgentId>, action: TradeAction, confidence: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            action,
            confidence,
            rationale: None,
        }
    }

    /// Neutral opinion used when the agent cannot form a view.
    #[must_use]
    pub fn abstain(agent_id: impl Into<AgentId>, rationale: impl Into<String>) -> Self {
        Self::new(agent_id, TradeAction::Hold, 0.0).with_rationale(rationale)
    }

    /// Attach a rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}
