//! Volume breakout agent.

use serde::{Deserialize, Serialize};

use super::{SignalSource, hold_confidence, scaled_confidence};
use crate::domain::shared::AgentId;
use crate::domain::signals::value_objects::{AgentOpinion, MarketSnapshot, TradeAction};

/// Parameters for [`VolumeBreakoutAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeBreakoutParams {
    /// Bars used for the average volume baseline.
    pub window: usize,
    /// Last-bar volume multiple of the baseline that counts as a breakout.
    pub volume_multiple: f64,
    /// Minimum absolute last-bar price move confirming the direction.
    pub min_move: f64,
}

impl Default for VolumeBreakoutParams {
    fn default() -> Self {
        Self {
            window: 20,
            volume_multiple: 2.0,
            min_move: 0.005,
        }
    }
}

/// Trades in the direction of a price move confirmed by a volume spike.
#[derive(Debug, Clone)]
pub struct VolumeBreakoutAgent {
    id: AgentId,
    params: VolumeBreakoutParams,
}

impl VolumeBreakoutAgent {
    /// Create a new volume breakout agent.
    #[must_use]
    pub fn new(id: impl Into<AgentId>, params: VolumeBreakoutParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}

impl SignalSource for VolumeBreakoutAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion {
        let prices = snapshot.price_series();
        let volumes = snapshot.volume_series();
        let Some(baseline) = snapshot.average_volume(self.params.window) else {
            return AgentOpinion::abstain(self.id.clone(), "insufficient history");
        };
        if prices.len() < 2 || baseline <= 0.0 {
            return AgentOpinion::abstain(self.id.clone(), "no volume baseline");
        }

        let last_volume = volumes[volumes.len() - 1];
        let ratio = last_volume / baseline;
        let previous = prices[prices.len() - 2];
        let change = if previous > 0.0 {
            (prices[prices.len() - 1] - previous) / previous
        } else {
            0.0
        };
        let rationale = format!("volume {:.2}x baseline, move {:.4}", ratio, change);

        let multiple = self.params.volume_multiple;
        let breakout = ratio >= multiple && change.abs() >= self.params.min_move;
        let (action, confidence) = if breakout && change > 0.0 {
            (TradeAction::Buy, scaled_confidence(ratio - multiple, multiple))
        } else if breakout {
            (TradeAction::Sell, scaled_confidence(ratio - multiple, multiple))
        } else {
            (TradeAction::Hold, hold_confidence(ratio, multiple))
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

    fn snapshot(last_price: i64, last_volume: i64) -> MarketSnapshot {
        let mut prices = vec![Decimal::new(100, 0); 5];
        let mut volumes = vec![Decimal::new(1_000, 0); 5];
        prices.push(Decimal::new(last_price, 0));
        volumes.push(Decimal::new(last_volume, 0));
        MarketSnapshot::new(Symbol::new("ETH-USD"), prices, volumes, Utc::now())
    }

    fn agent() -> VolumeBreakoutAgent {
        VolumeBreakoutAgent::new(
            "volume",
            VolumeBreakoutParams {
                window: 5,
                volume_multiple: 2.0,
                min_move: 0.005,
            },
        )
    }

    #[test]
    fn spike_with_up_move_buys() {
        let opinion = agent().analyze(&snapshot(102, 4_000));
        assert_eq!(opinion.action, TradeAction::Buy);
        assert_eq!(opinion.confidence, 1.0);
    }

    #[test]
    fn spike_with_down_move_sells() {
        let opinion = agent().analyze(&snapshot(98, 3_000));
        assert_eq!(opinion.action, TradeAction::Sell);
        assert!((opinion.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn spike_without_move_holds() {
        let opinion = agent().analyze(&snapshot(100, 5_000));
        assert_eq!(opinion.action, TradeAction::Hold);
    }
}
