//! Signals Bounded Context
//!
//! Market snapshots, agent opinions, and the closed set of signal agents that
//! turn a snapshot into a directional opinion.

pub mod agents;
pub mod value_objects;

pub use agents::{
    MeanReversionAgent, MeanReversionParams, MomentumAgent, MomentumParams, SignalAgent,
    SignalAgentKind, SignalSource, TrendFollowingAgent, TrendFollowingParams,
    VolumeBreakoutAgent, VolumeBreakoutParams,
};
pub use value_objects::{AgentOpinion, MarketSnapshot, TradeAction};
