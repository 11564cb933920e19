//! Observability module for metrics and logging.
//!
//! Metric helpers are no-ops until a recorder is installed with
//! [`init_metrics`], so library code and tests can call them freely.

mod logging;
mod metrics;

pub use logging::{LoggingError, init_logging};
pub use metrics::{
    MetricsConfig, MetricsError, circuit_state_value, init_metrics, record_child_order,
    record_circuit_state, record_decision, record_event_dropped, record_plan_outcome,
    record_venue_attempt,
};
