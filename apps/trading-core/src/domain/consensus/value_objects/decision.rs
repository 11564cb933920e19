//! Consensus decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Symbol;
use crate::domain::signals::{AgentOpinion, TradeAction};

/// Weighted score per action class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionScores {
    /// Weighted BUY score.
    pub buy: f64,
    /// Weighted SELL score.
    pub sell: f64,
    /// Weighted HOLD score.
    pub hold: f64,
}

impl ActionScores {
    /// Score of one action class.
    #[must_use]
    pub const fn score(&self, action: TradeAction) -> f64 {
        match action {
            TradeAction::Buy => self.buy,
            TradeAction::Sell => self.sell,
            TradeAction::Hold => self.hold,
        }
    }
}

/// Why the consensus settled on HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldReason {
    /// No opinions were supplied.
    NoOpinions,
    /// Neither BUY nor SELL reached the threshold.
    BelowThreshold,
    /// BUY and SELL both reached the threshold.
    ConflictingSignals,
    /// The opinion set was malformed.
    InvalidInput,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOpinions => write!(f, "NO_OPINIONS"),
            Self::BelowThreshold => write!(f, "BELOW_THRESHOLD"),
            Self::ConflictingSignals => write!(f, "CONFLICTING_SIGNALS"),
            Self::InvalidInput => write!(f, "INVALID_INPUT"),
        }
    }
}

/// Result of fusing one cycle's opinions for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusDecision {
    /// Instrument.
    pub symbol: Symbol,
    /// Final action.
    pub action: TradeAction,
    /// Score of the chosen action class.
    pub confidence: f64,
    /// Every class score.
    pub scores: ActionScores,
    /// Set when `action` is HOLD.
    pub hold_reason: Option<HoldReason>,
    /// Contributing opinions, kept for traceability.
    pub opinions: Vec<AgentOpinion>,
    /// Decision time.
    pub decided_at: DateTime<Utc>,
}

impl ConsensusDecision {
    /// HOLD with zero confidence.
    #[must_use]
    pub fn hold(symbol: Symbol, reason: HoldReason, opinions: Vec<AgentOpinion>) -> Self {
        Self {
            symbol,
            action: TradeAction::Hold,
            confidence: 0.0,
            scores: ActionScores::default(),
            hold_reason: Some(reason),
            opinions,
            decided_at: Utc::now(),
        }
    }

    /// Whether the decision calls for an order.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.action != TradeAction::Hold
    }
}
