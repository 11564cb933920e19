//! Market snapshot consumed by the signal agents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Point-in-time view of one symbol, produced externally each cycle.
///
/// Series are ordered oldest first and the last price element is the most
/// recent trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Instrument.
    pub symbol: Symbol,
    /// Last traded price.
    pub last_price: Decimal,
    /// Recent closing prices, oldest first.
    pub prices: Vec<Decimal>,
    /// Recent traded volumes aligned with `prices`.
    pub volumes: Vec<Decimal>,
    /// Snapshot time.
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Create a snapshot; the last price is taken from the series when present.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        prices: Vec<Decimal>,
        volumes: Vec<Decimal>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let last_price = prices.last().copied().unwrap_or(Decimal::ZERO);
        Self {
            symbol,
            last_price,
            prices,
            volumes,
            timestamp,
        }
    }

    /// Prices as `f64` for statistics.
    #[must_use]
    pub fn price_series(&self) -> Vec<f64> {
        self.prices.iter().filter_map(ToPrimitive::to_f64).collect()
    }

    /// Volumes as `f64` for statistics.
    #[must_use]
    pub fn volume_series(&self) -> Vec<f64> {
        self.volumes.iter().filter_map(ToPrimitive::to_f64).collect()
    }

    /// Simple moving average of the last `window` prices.
    #[must_use]
    pub fn simple_moving_average(&self, window: usize) -> Option<f64> {
        let prices = self.price_series();
        if window == 0 || prices.len() < window {
            return None;
        }
        let tail = &prices[prices.len() - window..];
        Some(tail.iter().sum::<f64>() / window as f64)
    }

    /// Average volume over the `window` bars preceding the latest one.
    #[must_use]
    pub fn average_volume(&self, window: usize) -> Option<f64> {
        let volumes = self.volume_series();
        if window == 0 || volumes.len() < window + 1 {
            return None;
        }
        let end = volumes.len() - 1;
        let slice = &volumes[end - window..end];
        Some(slice.iter().sum::<f64>() / window as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::new(
            Symbol::new("AAPL"),
            vec![dec!(100), dec!(102), dec!(104), dec!(106)],
            vec![dec!(10), dec!(20), dec!(30), dec!(90)],
            Utc::now(),
        )
    }

    #[test]
    fn last_price_comes_from_series() {
        assert_eq!(snapshot().last_price, dec!(106));
    }

    #[test]
    fn moving_average() {
        let snap = snapshot();
        assert_eq!(snap.simple_moving_average(2), Some(105.0));
        assert_eq!(snap.simple_moving_average(5), None);
        assert_eq!(snap.simple_moving_average(0), None);
    }

    #[test]
    fn average_volume_excludes_latest_bar() {
        let snap = snapshot();
        assert_eq!(snap.average_volume(3), Some(20.0));
        assert_eq!(snap.average_volume(4), None);
    }
}
