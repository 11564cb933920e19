//! Trading loop configuration.

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;
use crate::infrastructure::market_data::SyntheticMarketDataConfig;

/// Symbols traded and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Symbols evaluated every cycle.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Seconds between cycles.
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_seconds: u64,
    /// Parent order size per symbol.
    #[serde(default)]
    pub order_sizes: HashMap<String, Decimal>,
    /// Parent order size for symbols without an entry.
    #[serde(default = "default_order_size")]
    pub default_order_size: Decimal,
    /// Synthetic market data feed.
    #[serde(default)]
    pub market_data: SyntheticMarketDataConfig,
    /// Seed for a reproducible feed.
    #[serde(default)]
    pub market_data_seed: Option<u64>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            cycle_interval_seconds: default_cycle_interval(),
            order_sizes: HashMap::new(),
            default_order_size: default_order_size(),
            market_data: SyntheticMarketDataConfig::default(),
            market_data_seed: None,
        }
    }
}

impl TradingConfig {
    /// Normalised symbols.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(Symbol::new).collect()
    }

    /// Order sizes keyed by normalised symbol.
    #[must_use]
    pub fn order_sizes(&self) -> HashMap<Symbol, Decimal> {
        self.order_sizes
            .iter()
            .map(|(symbol, size)| (Symbol::new(symbol), *size))
            .collect()
    }

    /// Time between cycles.
    #[must_use]
    pub const fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_seconds)
    }
}

fn default_symbols() -> Vec<String> {
    vec!["AAPL".to_string()]
}

const fn default_cycle_interval() -> u64 {
    60
}

const fn default_order_size() -> Decimal {
    Decimal::ONE
}
