//! Signals Value Objects

mod market_snapshot;
mod opinion;

pub use market_snapshot::MarketSnapshot;
pub use opinion::{AgentOpinion, TradeAction};
