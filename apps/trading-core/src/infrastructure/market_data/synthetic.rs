//! Random-walk market data for paper trading.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::domain::shared::Symbol;
use crate::domain::signals::MarketSnapshot;

/// Synthetic feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticMarketDataConfig {
    /// Bars kept per snapshot.
    pub history_bars: usize,
    /// Starting price for every symbol.
    pub initial_price: Decimal,
    /// Average bar volume.
    pub base_volume: Decimal,
    /// Maximum relative move per bar, in basis points.
    pub max_move_bps: u32,
}

impl Default for SyntheticMarketDataConfig {
    fn default() -> Self {
        Self {
            history_bars: 60,
            initial_price: Decimal::from(100),
            base_volume: Decimal::from(10_000),
            max_move_bps: 50,
        }
    }
}

#[derive(Debug, Default)]
struct Series {
    prices: Vec<Decimal>,
    volumes: Vec<Decimal>,
}

/// Generates a bounded random walk per symbol, one new bar per snapshot.
#[derive(Debug)]
pub struct SyntheticMarketData {
    config: SyntheticMarketDataConfig,
    state: Mutex<(StdRng, HashMap<Symbol, Series>)>,
}

impl SyntheticMarketData {
    /// Create a feed seeded from the OS.
    #[must_use]
    pub fn new(config: SyntheticMarketDataConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a reproducible feed.
    #[must_use]
    pub fn seeded(config: SyntheticMarketDataConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SyntheticMarketDataConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: Mutex::new((rng, HashMap::new())),
        }
    }

    fn next_bar(config: &SyntheticMarketDataConfig, rng: &mut StdRng, last: Decimal) -> (Decimal, Decimal) {
        let max_move = i64::from(config.max_move_bps);
        let step = if max_move > 0 {
            rng.random_range(-max_move..=max_move)
        } else {
            0
        };
        let price = (last * (Decimal::ONE + Decimal::new(step, 4))).round_dp(4);
        let volume_pct = rng.random_range(50..=200);
        let volume = (config.base_volume * Decimal::new(volume_pct, 2)).round_dp(0);
        (price.max(Decimal::new(1, 4)), volume)
    }
}

#[async_trait]
impl MarketDataPort for SyntheticMarketData {
    async fn snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, MarketDataError> {
        let config = &self.config;
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (rng, all) = &mut *guard;
        let series = all.entry(symbol.clone()).or_default();

        if series.prices.is_empty() {
            let mut last = config.initial_price;
            for _ in 0..config.history_bars {
                let (price, volume) = Self::next_bar(config, rng, last);
                series.prices.push(price);
                series.volumes.push(volume);
                last = price;
            }
        } else {
            let last = series.prices.last().copied().unwrap_or(config.initial_price);
            let (price, volume) = Self::next_bar(config, rng, last);
            series.prices.push(price);
            series.volumes.push(volume);
        }

        let excess = series.prices.len().saturating_sub(config.history_bars);
        series.prices.drain(..excess);
        series.volumes.drain(..excess);

        Ok(MarketSnapshot::new(
            symbol.clone(),
            series.prices.clone(),
            series.volumes.clone(),
            Utc::now(),
        ))
    }
}
