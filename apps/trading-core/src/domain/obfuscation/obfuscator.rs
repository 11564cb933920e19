//! Child order perturbation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::time::Duration;

use super::ObfuscationConfig;
use crate::domain::execution_tactics::services::SIZE_DP;
use crate::domain::execution_tactics::value_objects::{ChildOrder, OrderSide};

/// Parts per million.
const PPM: i64 = 1_000_000;

/// Millionths of a unit per basis point.
const PPM_PER_BPS: i64 = 100;

/// Applies size fuzz, submit jitter and price offset to child orders.
///
/// The random source is injected; [`Obfuscator::seeded`] gives reproducible
/// sequences. Side, symbol, venue and plan linkage are never touched.
#[derive(Debug, Clone)]
pub struct Obfuscator<R: Rng = StdRng> {
    config: ObfuscationConfig,
    rng: R,
}

impl Obfuscator<StdRng> {
    /// Create an obfuscator seeded from the OS.
    #[must_use]
    pub fn new(config: ObfuscationConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a reproducible obfuscator.
    #[must_use]
    pub fn seeded(config: ObfuscationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Obfuscator<R> {
    /// Create an obfuscator over any random source.
    #[must_use]
    pub const fn with_rng(config: ObfuscationConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ObfuscationConfig {
        &self.config
    }

    /// Perturb one child order.
    ///
    /// The jitter is written to `submit_delay`; the caller sleeps it.
    #[must_use]
    pub fn perturb(&mut self, mut child: ChildOrder) -> ChildOrder {
        if !self.config.enabled {
            child.submit_delay = Duration::ZERO;
            return child;
        }

        child.size = self.fuzz_size(child.size);
        child.submit_delay = self.jitter();
        if child.is_limit() {
            child.limit_price = child
                .limit_price
                .map(|price| self.offset_price(price, child.side));
        }
        child
    }

    /// Size scaled by a factor in `[1 - fuzz, 1 + fuzz]`.
    pub fn fuzz_size(&mut self, size: Decimal) -> Decimal {
        let fuzz_ppm = (self.config.quantity_fuzz_range * PPM as f64).round() as i64;
        if fuzz_ppm <= 0 || size <= Decimal::ZERO {
            return size;
        }
        let delta = self.rng.random_range(-fuzz_ppm..=fuzz_ppm);
        let factor = Decimal::new(PPM + delta, 6);
        (size * factor).round_dp(SIZE_DP)
    }

    /// Submit delay in `[min, max]`.
    pub fn jitter(&mut self) -> Duration {
        let (min, max) = (self.config.jitter_min_ms, self.config.jitter_max_ms);
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(self.rng.random_range(min..=max))
    }

    /// Limit price moved away from the touch by `(0, max_offset]` bps.
    pub fn offset_price(&mut self, price: Decimal, side: OrderSide) -> Decimal {
        let max_ppm = i64::from(self.config.max_price_offset_bps) * PPM_PER_BPS;
        if max_ppm == 0 || price <= Decimal::ZERO {
            return price;
        }
        let offset_ppm = self.rng.random_range(1..=max_ppm);
        let offset = Decimal::new(offset_ppm, 6);
        match side {
            OrderSide::Buy => price * (Decimal::ONE + offset),
            OrderSide::Sell => price * (Decimal::ONE - offset),
        }
    }
}
