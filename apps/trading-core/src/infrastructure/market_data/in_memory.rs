//! Fixed snapshots for tests and replays.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::domain::shared::Symbol;
use crate::domain::signals::MarketSnapshot;

/// Serves whatever snapshot was last stored for a symbol.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    snapshots: RwLock<HashMap<Symbol, MarketSnapshot>>,
}

impl InMemoryMarketData {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the snapshot for its symbol.
    pub fn set_snapshot(&self, snapshot: MarketSnapshot) {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.symbol.clone(), snapshot);
    }
}

#[async_trait]
impl MarketDataPort for InMemoryMarketData {
    async fn snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, MarketDataError> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::UnknownSymbol {
                symbol: symbol.clone(),
            })
    }
}
