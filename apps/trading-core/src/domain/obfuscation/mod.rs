//! Obfuscation Bounded Context
//!
//! Perturbs child orders just before dispatch so the footprint of a plan is
//! harder to read off the tape: size fuzz, submit-time jitter and a small
//! passive price offset for limit orders.

mod config;
mod obfuscator;

pub use config::ObfuscationConfig;
pub use obfuscator::Obfuscator;
