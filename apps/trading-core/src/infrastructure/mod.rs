//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `venues/`: paper trading venue
//! - `market_data/`: synthetic and in-memory snapshot providers
//! - `events/`: channel and logging event publishers

pub mod events;
pub mod market_data;
pub mod venues;
