//! Z-score mean reversion agent.

use serde::{Deserialize, Serialize};

use super::{SignalSource, hold_confidence, scaled_confidence};
use crate::domain::shared::AgentId;
use crate::domain::signals::value_objects::{AgentOpinion, MarketSnapshot, TradeAction};

/// Parameters for [`MeanReversionAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionParams {
    /// Rolling window for mean and standard deviation.
    pub window: usize,
    /// Absolute z-score needed to fade the move.
    pub entry_z: f64,
    /// Z-score at which confidence saturates.
    pub max_z: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            window: 20,
            entry_z: 2.0,
            max_z: 4.0,
        }
    }
}

/// Fades prices that stretched far from their rolling mean.
#[derive(Debug, Clone)]
pub struct MeanReversionAgent {
    id: AgentId,
    params: MeanReversionParams,
}

impl MeanReversionAgent {
    /// Create a new mean reversion agent.
    #[must_use]
    pub fn new(id: impl Into<AgentId>, params: MeanReversionParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }

    fn z_score(&self, snapshot: &MarketSnapshot) -> Option<f64> {
        let prices = snapshot.price_series();
        let window = self.params.window.max(2);
        if prices.len() < window {
            return None;
        }
        let tail = &prices[prices.len() - window..];
        let mean = tail.iter().sum::<f64>() / window as f64;
        let variance = tail.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / window as f64;
        let std_dev = variance.sqrt();
        let last = tail[tail.len() - 1];

        if std_dev < f64::EPSILON {
            return Some(0.0);
        }
        Some((last - mean) / std_dev)
    }
}

impl SignalSource for MeanReversionAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion {
        let Some(z) = self.z_score(snapshot) else {
            return AgentOpinion::abstain(self.id.clone(), "insufficient history");
        };

        let entry = self.params.entry_z;
        let span = self.params.max_z - entry;
        let rationale = format!("z-score {:.2} over {} bars", z, self.params.window);

        let (action, confidence) = if z >= entry {
            (TradeAction::Sell, scaled_confidence(z - entry, span))
        } else if z <= -entry {
            (TradeAction::Buy, scaled_confidence(-z - entry, span))
        } else {
            (TradeAction::Hold, hold_confidence(z.abs(), entry))
        };

        AgentOpinion::new(self.id.clone(), action, confidence).with_rationale(rationale)
    }
}
