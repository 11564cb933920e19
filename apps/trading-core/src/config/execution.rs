//! Execution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::execution_tactics::{AlgorithmKind, ExecutionParams};
use crate::resilience::RetryPolicy;

/// Default algorithm, or automatic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmSetting {
    /// Pick per order from size, volume and confidence.
    #[default]
    #[serde(alias = "auto")]
    Auto,
    /// Always MARKET.
    Market,
    /// Always TWAP.
    Twap,
    /// Always VWAP.
    Vwap,
    /// Always ICEBERG.
    Iceberg,
    /// Always SNIPER.
    Sniper,
}

impl AlgorithmSetting {
    /// The fixed algorithm, or `None` for automatic selection.
    #[must_use]
    pub const fn fixed(self) -> Option<AlgorithmKind> {
        match self {
            Self::Auto => None,
            Self::Market => Some(AlgorithmKind::Market),
            Self::Twap => Some(AlgorithmKind::Twap),
            Self::Vwap => Some(AlgorithmKind::Vwap),
            Self::Iceberg => Some(AlgorithmKind::Iceberg),
            Self::Sniper => Some(AlgorithmKind::Sniper),
        }
    }
}

/// Slice retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff (milliseconds).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap (milliseconds).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Growth factor between retries.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Relative jitter applied to each backoff.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetrySettings {
    /// Convert to the resilience module's `RetryPolicy`.
    #[must_use]
    pub const fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.multiplier,
            jitter_factor: self.jitter,
        }
    }
}

/// Execution section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Default algorithm.
    #[serde(default)]
    pub algorithm: AlgorithmSetting,
    /// Per-algorithm parameters.
    #[serde(flatten)]
    pub params: ExecutionParams,
    /// Slice retry policy.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Interval between status polls of resting orders (milliseconds).
    #[serde(default = "default_fill_poll_interval_ms")]
    pub fill_poll_interval_ms: u64,
    /// Fill wait for market orders that did not fill on placement (seconds).
    #[serde(default = "default_market_fill_timeout")]
    pub market_fill_timeout_seconds: u64,
    /// Decision confidence at or above which urgency is high.
    #[serde(default = "default_urgency_cutoff")]
    pub urgency_cutoff: f64,
    /// Bars averaged for the size-vs-volume ratio.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmSetting::default(),
            params: ExecutionParams::default(),
            retry: RetrySettings::default(),
            fill_poll_interval_ms: default_fill_poll_interval_ms(),
            market_fill_timeout_seconds: default_market_fill_timeout(),
            urgency_cutoff: default_urgency_cutoff(),
            volume_window: default_volume_window(),
        }
    }
}

impl ExecutionConfig {
    /// Status poll interval.
    #[must_use]
    pub const fn fill_poll_interval(&self) -> Duration {
        Duration::from_millis(self.fill_poll_interval_ms)
    }

    /// Market order fill wait.
    #[must_use]
    pub const fn market_fill_timeout(&self) -> Duration {
        Duration::from_secs(self.market_fill_timeout_seconds)
    }
}

const fn default_max_retries() -> u32 {
    1
}

const fn default_initial_backoff_ms() -> u64 {
    250
}

const fn default_max_backoff_ms() -> u64 {
    5_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter() -> f64 {
    0.2
}

const fn default_fill_poll_interval_ms() -> u64 {
    1_000
}

const fn default_market_fill_timeout() -> u64 {
    30
}

const fn default_urgency_cutoff() -> f64 {
    0.85
}

const fn default_volume_window() -> usize {
    20
}
