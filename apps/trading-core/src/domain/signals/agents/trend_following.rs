//! Moving-average crossover agent.

use serde::{Deserialize, Serialize};

use super::{SignalSource, hold_confidence, scaled_confidence};
use crate::domain::shared::AgentId;
use crate::domain::signals::value_objects::{AgentOpinion, MarketSnapshot, TradeAction};

/// Parameters for [`TrendFollowingAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFollowingParams {
    /// Fast moving-average window.
    pub fast_window: usize,
    /// Slow moving-average window.
    pub slow_window: usize,
    /// Minimum relative spread between the averages (0.002 = 0.2%).
    pub min_spread: f64,
    /// Spread at which confidence saturates.
    pub saturation: f64,
}

impl Default for TrendFollowingParams {
    fn default() -> Self {
        Self {
            fast_window: 5,
            slow_window: 20,
            min_spread: 0.002,
            saturation: 0.02,
        }
    }
}

/// Follows the direction of the fast average relative to the slow one.
#[derive(Debug, Clone)]
pub struct TrendFollowingAgent {
    id: AgentId,
    params: TrendFollowingParams,
}

impl TrendFollowingAgent {
    /// Create a new trend following agent.
    #[must_use]
    pub fn new(id: impl Into<AgentId>, params: TrendFollowingParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}

impl SignalSource for TrendFollowingAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion {
        let fast = snapshot.simple_moving_average(self.params.fast_window);
        let slow = snapshot.simple_moving_average(self.params.slow_window);
        let (Some(fast), Some(slow)) = (fast, slow) else {
            return AgentOpinion::abstain(self.id.clone(), "insufficient history");
        };
        if slow <= 0.0 {
            return AgentOpinion::abstain(self.id.clone(), "non-positive slow average");
        }

        let spread = (fast - slow) / slow;
        let min_spread = self.params.min_spread;
        let span = self.params.saturation - min_spread;
        let rationale = format!("fast/slow spread {:.4}", spread);

        let (action, confidence) = if spread >= min_spread {
            (TradeAction::Buy, scaled_confidence(spread - min_spread, span))
        } else if spread <= -min_spread {
            (TradeAction::Sell, scaled_confidence(-spread - min_spread, span))
        } else {
            (TradeAction::Hold, hold_confidence(spread.abs(), min_spread))
        };

        AgentOpinion::new(self.id.clone(), action, confidence).with_rationale(rationale)
    }
}
