//! Market data adapters.

mod in_memory;
mod synthetic;

pub use in_memory::InMemoryMarketData;
pub use synthetic::{SyntheticMarketData, SyntheticMarketDataConfig};
