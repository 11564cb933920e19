//! Domain Layer
//!
//! The innermost layer containing the trading core's business logic with zero
//! infrastructure dependencies. Everything here is synchronous and pure except
//! where a component explicitly owns state (the execution plan lifecycle).
//!
//! # Bounded Contexts
//!
//! - [`signals`]: Market snapshots, agent opinions and the concrete signal agents
//! - [`consensus`]: Weighted fusion of agent opinions into one decision
//! - [`routing`]: Venue preference tables and routing plans
//! - [`execution_tactics`]: MARKET, TWAP, VWAP, ICEBERG and SNIPER planning
//! - [`obfuscation`]: Size, timing and price perturbation of child orders

pub mod consensus;
pub mod execution_tactics;
pub mod obfuscation;
pub mod routing;
pub mod shared;
pub mod signals;
