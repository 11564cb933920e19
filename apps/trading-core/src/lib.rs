// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Trading Core - Decision & Execution Library
//!
//! Autonomous trading core: signal agents vote, a consensus engine fuses the
//! votes into one decision, a router picks venues behind per-venue circuit
//! breakers and an execution scheduler works the order with a MARKET, TWAP,
//! VWAP, ICEBERG or SNIPER plan whose child orders are obfuscated before they
//! leave the process.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: pure business logic
//!   - `signals`: market snapshots, opinions, signal agents
//!   - `consensus`: weighted vote fusion
//!   - `routing`: venue preference and routing plans
//!   - `execution_tactics`: execution plans and slice schedules
//!   - `obfuscation`: size, timing and price perturbation
//!
//! - **Application**: ports and orchestration
//!   - `ports`: `VenuePort`, `MarketDataPort`, `EventPublisherPort`
//!   - `services`: `VenueDispatcher`, `ExecutionScheduler`, `TradingCycle`
//!
//! - **Infrastructure**: paper venue, synthetic market data, event sinks
//!
//! - **Resilience**: per-venue circuit breakers and retry backoff

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Ports and orchestration services.
pub mod application;

/// Infrastructure layer - Adapters for the application ports.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Metrics and logging setup.
pub mod observability;

/// Circuit breakers and retry policies.
pub mod resilience;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::consensus::{ConsensusConfig, ConsensusDecision, ConsensusEngine, DecisionError};
pub use domain::execution_tactics::{
    AlgorithmKind, ExecutionOutcome, ExecutionParams, ExecutionPlan, ExecutionStatus, ParentOrder,
    SliceReport, TacticError, build_plan,
};
pub use domain::obfuscation::{ObfuscationConfig, Obfuscator};
pub use domain::routing::{PlatformRouter, RoutingError, RoutingPlan, VenuePreferenceTable};
pub use domain::shared::{Symbol, SymbolClass, VenueId};
pub use domain::signals::{AgentOpinion, MarketSnapshot, SignalAgent, SignalSource, TradeAction};

// Application re-exports
pub use application::ports::{
    EventPublisherPort, MarketDataPort, NoOpEventPublisher, TradingEvent, VenueError, VenuePort,
};
pub use application::services::{
    CycleConfig, CycleReport, ExecutionHandle, ExecutionScheduler, SchedulerConfig, TradingCycle,
    VenueDispatcher, VenueRegistry,
};

// Resilience re-exports
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
