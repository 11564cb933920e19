//! Signal agent roster configuration.

use serde::{Deserialize, Serialize};

use crate::domain::consensus::AgentWeights;
use crate::domain::shared::AgentId;
use crate::domain::signals::{
    MeanReversionParams, MomentumParams, SignalAgent, SignalAgentKind, TrendFollowingParams,
    VolumeBreakoutParams,
};

/// One configured signal agent.
///
/// ```yaml
/// - id: momentum
///   kind: momentum
///   lookback: 10
///   weight: 1.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent identifier, unique within the roster.
    pub id: String,
    /// Strategy and its parameters.
    #[serde(flatten)]
    pub kind: SignalAgentKind,
    /// Consensus weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl AgentConfig {
    /// Build the agent.
    #[must_use]
    pub fn build(&self) -> SignalAgent {
        SignalAgent::from_kind(self.id.as_str(), self.kind.clone())
    }
}

/// Build every configured agent.
#[must_use]
pub fn build_agents(agents: &[AgentConfig]) -> Vec<SignalAgent> {
    agents.iter().map(AgentConfig::build).collect()
}

/// Consensus weights for the roster.
#[must_use]
pub fn agent_weights(agents: &[AgentConfig]) -> AgentWeights {
    agents
        .iter()
        .map(|agent| (AgentId::new(agent.id.as_str()), agent.weight))
        .collect()
}

pub(super) fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig {
            id: "momentum".to_string(),
            kind: SignalAgentKind::Momentum(MomentumParams::default()),
            weight: default_weight(),
        },
        AgentConfig {
            id: "mean_reversion".to_string(),
            kind: SignalAgentKind::MeanReversion(MeanReversionParams::default()),
            weight: default_weight(),
        },
        AgentConfig {
            id: "trend_following".to_string(),
            kind: SignalAgentKind::TrendFollowing(TrendFollowingParams::default()),
            weight: default_weight(),
        },
        AgentConfig {
            id: "volume_breakout".to_string(),
            kind: SignalAgentKind::VolumeBreakout(VolumeBreakoutParams::default()),
            weight: default_weight(),
        },
    ]
}

const fn default_weight() -> f64 {
    1.0
}
