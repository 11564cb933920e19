//! Rate-of-change momentum agent.

use serde::{Deserialize, Serialize};

use super::{SignalSource, hold_confidence, scaled_confidence};
use crate::domain::shared::AgentId;
use crate::domain::signals::value_objects::{AgentOpinion, MarketSnapshot, TradeAction};

/// Parameters for [`MomentumAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumParams {
    /// Bars between the reference price and the last price.
    pub lookback: usize,
    /// Minimum absolute rate of change to take a side (0.01 = 1%).
    pub threshold: f64,
    /// Rate of change at which confidence saturates.
    pub saturation: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            lookback: 10,
            threshold: 0.01,
            saturation: 0.05,
        }
    }
}

/// Buys strength and sells weakness measured over a fixed lookback.
#[derive(Debug, Clone)]
pub struct MomentumAgent {
    id: AgentId,
    params: MomentumParams,
}

impl MomentumAgent {
    /// Create a new momentum agent.
    #[must_use]
    pub fn new(id: impl Into<AgentId>, params: MomentumParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }

    /// Rate of change over the lookback, if enough history exists.
    fn rate_of_change(&self, snapshot: &MarketSnapshot) -> Option<f64> {
        let prices = snapshot.price_series();
        let lookback = self.params.lookback.max(1);
        if prices.len() <= lookback {
            return None;
        }
        let last = prices[prices.len() - 1];
        let reference = prices[prices.len() - 1 - lookback];
        if reference <= 0.0 {
            return None;
        }
        Some((last - reference) / reference)
    }
}

impl SignalSource for MomentumAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion {
        let Some(roc) = self.rate_of_change(snapshot) else {
            return AgentOpinion::abstain(self.id.clone(), "insufficient history");
        };

        let threshold = self.params.threshold;
        let span = self.params.saturation - threshold;
        let rationale = format!("rate of change {:.4} over {} bars", roc, self.params.lookback);

        let (action, confidence) = if roc >= threshold {
            (TradeAction::Buy, scaled_confidence(roc - threshold, span))
        } else if roc <= -threshold {
            (TradeAction::Sell, scaled_confidence(-roc - threshold, span))
        } else {
            (TradeAction::Hold, hold_confidence(roc.abs(), threshold))
        };

        AgentOpinion::new(self.id.clone(), action, confidence).with_rationale(rationale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Symbol;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn snapshot(prices: &[i64]) -> MarketSnapshot {
        MarketSnapshot::new(
            Symbol::new("AAPL"),
            prices.iter().map(|p| Decimal::new(*p, 0)).collect(),
            vec![Decimal::ONE; prices.len()],
            Utc::now(),
        )
    }

    fn agent() -> MomentumAgent {
        MomentumAgent::new(
            "momentum",
            MomentumParams {
                lookback: 3,
                threshold: 0.01,
                saturation: 0.05,
            },
        )
    }

    #[test]
    fn rising_prices_buy() {
        let opinion = agent().analyze(&snapshot(&[100, 101, 103, 110]));
        assert_eq!(opinion.action, TradeAction::Buy);
        assert_eq!(opinion.confidence, 1.0);
    }

    #[test]
    fn falling_prices_sell() {
        let opinion = agent().analyze(&snapshot(&[100, 99, 99, 98]));
        assert_eq!(opinion.action, TradeAction::Sell);
        assert!(opinion.confidence >= 0.5 && opinion.confidence < 1.0);
    }

    #[test]
    fn flat_prices_hold() {
        let opinion = agent().analyze(&snapshot(&[100, 100, 100, 100]));
        assert_eq!(opinion.action, TradeAction::Hold);
        assert_eq!(opinion.confidence, 1.0);
    }

    #[test]
    fn short_history_abstains() {
        let opinion = agent().analyze(&snapshot(&[100, 110]));
        assert_eq!(opinion.action, TradeAction::Hold);
        assert_eq!(opinion.confidence, 0.0);
    }
}
