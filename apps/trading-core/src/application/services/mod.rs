//! Application Services
//!
//! - [`VenueDispatcher`]: sends child orders to venues behind the breakers
//! - [`ExecutionScheduler`]: runs execution plans as background tasks
//! - [`TradingCycle`]: one snapshot-to-outcome pass per symbol

mod execution_scheduler;
mod trading_cycle;
mod venue_dispatcher;

pub use execution_scheduler::{ExecutionHandle, ExecutionScheduler, SchedulerConfig};
pub use trading_cycle::{CycleConfig, CycleError, CycleReport, TradingCycle};
pub use venue_dispatcher::{
    AttemptFailure, DEFAULT_VENUE_TIMEOUT, DispatchError, DispatchedOrder, VenueAttempt,
    VenueDispatcher, VenueEndpoint, VenueRegistry,
};
