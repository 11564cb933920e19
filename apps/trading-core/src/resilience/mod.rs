//! Resilience patterns for venue connectivity.
//!
//! - [`CircuitBreaker`]: per-venue fail-fast with half-open probing
//! - [`RetryPolicy`]: backoff for failed slice dispatches

mod circuit_breaker;
mod retry;

pub use circuit_breaker::{
    BreakerTransition, CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState,
    TransitionListener, VenueHealth,
};
pub use retry::{ExponentialBackoffCalculator, RetryPolicy};
