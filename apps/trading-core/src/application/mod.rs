//! Application Layer
//!
//! Orchestrates the domain: ports describe the outside world (venues, market
//! data, event sinks) and services drive one trading cycle from snapshot to
//! execution outcome.

pub mod ports;
pub mod services;
