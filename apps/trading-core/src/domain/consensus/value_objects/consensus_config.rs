//! Consensus configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::shared::AgentId;

/// Default decision threshold.
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.60;

/// Per-agent weights; agents without an entry weigh 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentWeights(HashMap<AgentId, f64>);

impl AgentWeights {
    /// Create an empty weight table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight for an agent.
    #[must_use]
    pub fn with(mut self, agent: impl Into<AgentId>, weight: f64) -> Self {
        self.0.insert(agent.into(), weight);
        self
    }

    /// Weight for an agent.
    #[must_use]
    pub fn weight_for(&self, agent: &AgentId) -> f64 {
        self.0.get(agent).copied().unwrap_or(1.0)
    }
}

impl FromIterator<(AgentId, f64)> for AgentWeights {
    fn from_iter<I: IntoIterator<Item = (AgentId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Consensus engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Minimum weighted score for BUY or SELL to beat HOLD.
    pub threshold: f64,
    /// Per-agent weights.
    pub weights: AgentWeights,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONSENSUS_THRESHOLD,
            weights: AgentWeights::default(),
        }
    }
}

impl ConsensusConfig {
    /// Create a configuration with the given threshold and equal weights.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            weights: AgentWeights::default(),
        }
    }

    /// Replace the weight table.
    #[must_use]
    pub fn with_weights(mut self, weights: AgentWeights) -> Self {
        self.weights = weights;
        self
    }
}
