//! Prometheus metrics for the trading core.
//!
//! Covers consensus decisions, circuit breakers, venue dispatch, child
//! orders, plan outcomes and dropped events.
//!
//! # Example
//!
//! ```ignore
//! use trading_core::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_venue_attempt("alpaca", "accepted");
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::domain::execution_tactics::value_objects::{AlgorithmKind, ExecutionStatus, SliceStatus};
use crate::domain::signals::TradeAction;
use crate::resilience::CircuitState;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for confidence measurements.
    pub confidence_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            confidence_buckets: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.confidence_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Consensus Metrics
// ============================================================================

/// Record a consensus decision.
pub fn record_decision(symbol: &str, action: TradeAction, confidence: f64) {
    counter!(
        "consensus_decisions_total",
        "symbol" => symbol.to_string(),
        "action" => action.to_string()
    )
    .increment(1);

    histogram!("consensus_confidence", "action" => action.to_string()).record(confidence);
}

// ============================================================================
// Circuit Breaker Metrics
// ============================================================================

/// Gauge value for a circuit state (0=closed, 1=open, 2=half_open).
#[must_use]
pub const fn circuit_state_value(state: CircuitState) -> f64 {
    match state {
        CircuitState::Closed => 0.0,
        CircuitState::Open => 1.0,
        CircuitState::HalfOpen => 2.0,
    }
}

/// Record a circuit breaker transition.
pub fn record_circuit_state(venue: &str, state: CircuitState) {
    gauge!("circuit_breaker_state", "venue" => venue.to_string())
        .set(circuit_state_value(state));

    counter!(
        "circuit_breaker_transitions_total",
        "venue" => venue.to_string(),
        "to" => state.to_string()
    )
    .increment(1);
}

// ============================================================================
// Execution Metrics
// ============================================================================

/// Record one `place_order` attempt.
///
/// * `result` - "accepted", "rejected", "timeout", "transport_error",
///   "circuit_unavailable" or "unknown_venue"
pub fn record_venue_attempt(venue: &str, result: &str) {
    counter!(
        "venue_attempts_total",
        "venue" => venue.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

/// Record a finished child order.
pub fn record_child_order(venue: &str, status: SliceStatus) {
    counter!(
        "child_orders_total",
        "venue" => venue.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a finished execution plan.
pub fn record_plan_outcome(algorithm: AlgorithmKind, status: ExecutionStatus) {
    counter!(
        "execution_plans_total",
        "algorithm" => algorithm.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record an event dropped by a publisher.
pub fn record_event_dropped(kind: &str, reason: &str) {
    counter!(
        "events_dropped_total",
        "kind" => kind.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}
