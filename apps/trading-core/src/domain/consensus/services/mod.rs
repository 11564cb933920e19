//! Consensus Domain Services

mod consensus_engine;

pub use consensus_engine::ConsensusEngine;
