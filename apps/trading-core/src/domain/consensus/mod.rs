//! Consensus Bounded Context
//!
//! Weighted fusion of independent agent opinions into a single BUY, SELL or
//! HOLD decision per symbol per cycle.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::DecisionError;
pub use services::ConsensusEngine;
pub use value_objects::{
    ActionScores, AgentWeights, ConsensusConfig, ConsensusDecision, DEFAULT_CONSENSUS_THRESHOLD,
    HoldReason,
};
