//! Consensus Engine Domain Service

use chrono::Utc;

use crate::domain::consensus::DecisionError;
use crate::domain::consensus::value_objects::{
    ActionScores, ConsensusConfig, ConsensusDecision, HoldReason,
};
use crate::domain::shared::Symbol;
use crate::domain::signals::{AgentOpinion, TradeAction};

/// Fuses agent opinions into one decision by weighted confidence.
///
/// For each action class `a`:
///
/// ```text
/// score(a) = Σ_{action_i = a} confidence_i × weight_i / Σ_i weight_i
/// ```
///
/// BUY wins when its score reaches the threshold and SELL's does not, SELL
/// symmetrically; anything else is HOLD. The engine is pure: the same
/// opinions and configuration always give the same action and confidence.
#[derive(Debug, Clone, Default)]
pub struct ConsensusEngine {
    config: ConsensusConfig,
}

impl ConsensusEngine {
    /// Create a new engine.
    #[must_use]
    pub const fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Decide, turning malformed input into HOLD with zero confidence.
    #[must_use]
    pub fn decide(&self, symbol: Symbol, opinions: Vec<AgentOpinion>) -> ConsensusDecision {
        match self.validate(&opinions) {
            Ok(()) => self.aggregate(symbol, opinions),
            Err(e) => {
                tracing::warn!(
                    symbol = %symbol,
                    error = %e,
                    "Malformed opinion set, defaulting to HOLD"
                );
                ConsensusDecision::hold(symbol, HoldReason::InvalidInput, opinions)
            }
        }
    }

    /// Decide, surfacing malformed input as an error.
    pub fn try_decide(
        &self,
        symbol: Symbol,
        opinions: Vec<AgentOpinion>,
    ) -> Result<ConsensusDecision, DecisionError> {
        self.validate(&opinions)?;
        Ok(self.aggregate(symbol, opinions))
    }

    /// Weighted scores for an opinion set; `None` when the set is empty.
    #[must_use]
    pub fn scores(&self, opinions: &[AgentOpinion]) -> Option<ActionScores> {
        if opinions.is_empty() {
            return None;
        }

        let total_weight: f64 = opinions
            .iter()
            .map(|o| self.config.weights.weight_for(&o.agent_id))
            .sum();
        if total_weight <= 0.0 {
            return None;
        }

        let mut scores = ActionScores::default();
        for opinion in opinions {
            let contribution = opinion.confidence * self.config.weights.weight_for(&opinion.agent_id);
            match opinion.action {
                TradeAction::Buy => scores.buy += contribution,
                TradeAction::Sell => scores.sell += contribution,
                TradeAction::Hold => scores.hold += contribution,
            }
        }
        scores.buy /= total_weight;
        scores.sell /= total_weight;
        scores.hold /= total_weight;
        Some(scores)
    }

    fn validate(&self, opinions: &[AgentOpinion]) -> Result<(), DecisionError> {
        if opinions.is_empty() {
            return Ok(());
        }

        let mut total_weight = 0.0;
        for opinion in opinions {
            if !(0.0..=1.0).contains(&opinion.confidence) {
                return Err(DecisionError::ConfidenceOutOfRange {
                    agent: opinion.agent_id.clone(),
                    confidence: opinion.confidence,
                });
            }
            let weight = self.config.weights.weight_for(&opinion.agent_id);
            if !weight.is_finite() || weight < 0.0 {
                return Err(DecisionError::InvalidWeight {
                    agent: opinion.agent_id.clone(),
                    weight,
                });
            }
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return Err(DecisionError::ZeroTotalWeight);
        }
        Ok(())
    }

    fn aggregate(&self, symbol: Symbol, opinions: Vec<AgentOpinion>) -> ConsensusDecision {
        let Some(scores) = self.scores(&opinions) else {
            return ConsensusDecision::hold(symbol, HoldReason::NoOpinions, opinions);
        };

        let threshold = self.config.threshold;
        let buy_clears = scores.buy >= threshold;
        let sell_clears = scores.sell >= threshold;

        let (action, hold_reason) = match (buy_clears, sell_clears) {
            (true, false) => (TradeAction::Buy, None),
            (false, true) => (TradeAction::Sell, None),
            (true, true) => (TradeAction::Hold, Some(HoldReason::ConflictingSignals)),
            (false, false) => (TradeAction::Hold, Some(HoldReason::BelowThreshold)),
        };

        ConsensusDecision {
            symbol,
            action,
            confidence: scores.score(action),
            scores,
            hold_reason,
            opinions,
            decided_at: Utc::now(),
        }
    }
}
