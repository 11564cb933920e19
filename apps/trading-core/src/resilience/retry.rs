//! Retry policy with exponential backoff for slice dispatch.
//!
//! A child order that every routed venue refused is retried after a
//! jittered backoff before the plan gives up on it.
//!
//! # Example
//!
//! ```rust,ignore
//! use trading_core::resilience::{ExponentialBackoffCalculator, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let mut backoff = ExponentialBackoffCalculator::new(&policy);
//!
//! let delay = backoff.next_backoff(); // ~250ms with jitter
//! assert!(backoff.next_backoff().is_none()); // one retry only
//! ```

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy for failed slice dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt (default: 1).
    pub max_retries: u32,
    /// Initial backoff duration (default: 250ms).
    pub initial_backoff: Duration,
    /// Maximum backoff duration (default: 5s).
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth (default: 2.0).
    pub backoff_multiplier: f64,
    /// Jitter factor for randomization (default: 0.2 = ±20%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a fixed delay and no jitter.
    #[must_use]
    pub const fn fixed(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff: backoff,
            max_backoff: backoff,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }
}

/// Calculator for exponential backoff with jitter.
#[derive(Debug)]
pub struct ExponentialBackoffCalculator {
    current_attempt: u32,
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoffCalculator {
    /// Create a new backoff calculator from a retry policy.
    #[must_use]
    pub const fn new(policy: &RetryPolicy) -> Self {
        Self {
            current_attempt: 0,
            max_retries: policy.max_retries,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Get the next backoff duration with jitter.
    ///
    /// Returns `None` once the retries are used up.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_retries {
            return None;
        }

        let base_ms = self.base_backoff_ms();
        let capped_ms = self.apply_jitter(base_ms).min(self.max_backoff_ms);
        self.current_attempt += 1;

        Some(Duration::from_millis(capped_ms))
    }

    fn base_backoff_ms(&self) -> u64 {
        let multiplier = self.backoff_multiplier.powi(self.current_attempt as i32);
        let backoff = (self.initial_backoff_ms as f64 * multiplier) as u64;
        backoff.min(self.max_backoff_ms)
    }

    /// Random value in `[backoff * (1 - jitter), backoff * (1 + jitter)]`.
    fn apply_jitter(&self, backoff_ms: u64) -> u64 {
        if self.jitter_factor <= 0.0 || backoff_ms == 0 {
            return backoff_ms;
        }
        let jitter_range = backoff_ms as f64 * self.jitter_factor;
        let min = (backoff_ms as f64 - jitter_range).max(0.0);
        let max = backoff_ms as f64 + jitter_range;
        rand::rng().random_range(min..=max) as u64
    }

    /// Retries handed out so far.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Check if more retries are available.
    #[must_use]
    pub const fn has_remaining_attempts(&self) -> bool {
        self.current_attempt < self.max_retries
    }

    /// Reset the calculator for the next slice.
    pub const fn reset(&mut self) {
        self.current_attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_retries_once() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.initial_backoff, Duration::from_millis(250));
    }

    #[test]
    fn backoff_exhausts_after_max_retries() {
        let mut backoff = ExponentialBackoffCalculator::new(&RetryPolicy::default());
        assert!(backoff.has_remaining_attempts());

        let delay = backoff.next_backoff().unwrap();
        assert!(delay >= Duration::from_millis(200));
        assert!(delay <= Duration::from_millis(300));

        assert!(backoff.next_backoff().is_none());
        assert_eq!(backoff.current_attempt(), 1);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_retries: 6,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        };
        let mut backoff = ExponentialBackoffCalculator::new(&policy);
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_backoff())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn fixed_policy_has_no_jitter() {
        let mut backoff =
            ExponentialBackoffCalculator::new(&RetryPolicy::fixed(2, Duration::from_millis(50)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(50)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(50)));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn reset_restores_attempts() {
        let mut backoff = ExponentialBackoffCalculator::new(&RetryPolicy::default());
        let _ = backoff.next_backoff();
        backoff.reset();
        assert!(backoff.has_remaining_attempts());
    }
}
