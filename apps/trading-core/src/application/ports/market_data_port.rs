//! Market Data Port (Driven Port)
//!
//! Interface for fetching the per-cycle market snapshot.

use async_trait::async_trait;

use crate::domain::shared::Symbol;
use crate::domain::signals::MarketSnapshot;

/// Market data error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// Symbol not covered by the provider.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// The symbol.
        symbol: Symbol,
    },

    /// Provider unreachable or failing.
    #[error("Market data unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for market data.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Snapshot for one symbol.
    async fn snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, MarketDataError>;
}
