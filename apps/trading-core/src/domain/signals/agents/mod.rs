//! Signal agents.
//!
//! Agents are polymorphic over one capability, [`SignalSource::analyze`]. The
//! set of strategies is closed and expressed as the [`SignalAgent`] tagged
//! union so configuration can build any of them without reflection.

mod mean_reversion;
mod momentum;
mod trend_following;
mod volume_breakout;

use serde::{Deserialize, Serialize};

pub use mean_reversion::{MeanReversionAgent, MeanReversionParams};
pub use momentum::{MomentumAgent, MomentumParams};
pub use trend_following::{TrendFollowingAgent, TrendFollowingParams};
pub use volume_breakout::{VolumeBreakoutAgent, VolumeBreakoutParams};

use crate::domain::shared::AgentId;
use crate::domain::signals::value_objects::{AgentOpinion, MarketSnapshot};

/// Capability shared by every signal agent.
pub trait SignalSource {
    /// Agent identifier.
    fn id(&self) -> &AgentId;

    /// Produce an opinion from a market snapshot. Must be side-effect free.
    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion;
}

/// Strategy selector with its parameters, as found in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalAgentKind {
    /// Rate-of-change momentum.
    Momentum(MomentumParams),
    /// Z-score mean reversion.
    MeanReversion(MeanReversionParams),
    /// Moving-average crossover.
    TrendFollowing(TrendFollowingParams),
    /// Volume spike with price confirmation.
    VolumeBreakout(VolumeBreakoutParams),
}

/// Closed set of concrete signal agents.
#[derive(Debug, Clone)]
pub enum SignalAgent {
    /// See [`MomentumAgent`].
    Momentum(MomentumAgent),
    /// See [`MeanReversionAgent`].
    MeanReversion(MeanReversionAgent),
    /// See [`TrendFollowingAgent`].
    TrendFollowing(TrendFollowingAgent),
    /// See [`VolumeBreakoutAgent`].
    VolumeBreakout(VolumeBreakoutAgent),
}

impl SignalAgent {
    /// Build an agent from its configured kind.
    #[must_use]
    pub fn from_kind(id: impl Into<AgentId>, kind: SignalAgentKind) -> Self {
        let id = id.into();
        match kind {
            SignalAgentKind::Momentum(params) => Self::Momentum(MomentumAgent::new(id, params)),
            SignalAgentKind::MeanReversion(params) => {
                Self::MeanReversion(MeanReversionAgent::new(id, params))
            }
            SignalAgentKind::TrendFollowing(params) => {
                Self::TrendFollowing(TrendFollowingAgent::new(id, params))
            }
            SignalAgentKind::VolumeBreakout(params) => {
                Self::VolumeBreakout(VolumeBreakoutAgent::new(id, params))
            }
        }
    }

    /// The default agent roster: one agent of each strategy.
    #[must_use]
    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::Momentum(MomentumAgent::new("momentum", MomentumParams::default())),
            Self::MeanReversion(MeanReversionAgent::new(
                "mean_reversion",
                MeanReversionParams::default(),
            )),
            Self::TrendFollowing(TrendFollowingAgent::new(
                "trend_following",
                TrendFollowingParams::default(),
            )),
            Self::VolumeBreakout(VolumeBreakoutAgent::new(
                "volume_breakout",
                VolumeBreakoutParams::default(),
            )),
        ]
    }
}

impl SignalSource for SignalAgent {
    fn id(&self) -> &AgentId {
        match self {
            Self::Momentum(agent) => agent.id(),
            Self::MeanReversion(agent) => agent.id(),
            Self::TrendFollowing(agent) => agent.id(),
            Self::VolumeBreakout(agent) => agent.id(),
        }
    }

    fn analyze(&self, snapshot: &MarketSnapshot) -> AgentOpinion {
        match self {
            Self::Momentum(agent) => agent.analyze(snapshot),
            Self::MeanReversion(agent) => agent.analyze(snapshot),
            Self::TrendFollowing(agent) => agent.analyze(snapshot),
            Self::VolumeBreakout(agent) => agent.analyze(snapshot),
        }
    }
}

/// Map a signal that exceeded its trigger to a confidence in `[0.5, 1.0]`.
fn scaled_confidence(excess: f64, span: f64) -> f64 {
    if span <= 0.0 || !excess.is_finite() {
        return 0.5;
    }
    0.5 + 0.5 * (excess / span).clamp(0.0, 1.0)
}

/// Confidence of a HOLD opinion that stayed inside its trigger band.
fn hold_confidence(magnitude: f64, trigger: f64) -> f64 {
    if trigger <= 0.0 || !magnitude.is_finite() {
        return 0.0;
    }
    (1.0 - magnitude / trigger).clamp(0.0, 1.0)
}
