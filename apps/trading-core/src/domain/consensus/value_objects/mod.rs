//! Consensus Value Objects

mod consensus_config;
mod decision;

pub use consensus_config::{AgentWeights, ConsensusConfig, DEFAULT_CONSENSUS_THRESHOLD};
pub use decision::{ActionScores, ConsensusDecision, HoldReason};
