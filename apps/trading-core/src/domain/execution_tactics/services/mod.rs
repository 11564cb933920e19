//! Execution Tactics Domain Services

mod iceberg_executor;
mod plan_builder;
mod sizing;
mod tactic_selector;
mod twap_executor;
mod vwap_executor;

pub use iceberg_executor::IcebergExecutor;
pub use plan_builder::build_plan;
pub use sizing::{SIZE_DP, round_to_lot};
pub use tactic_selector::TacticSelector;
pub use twap_executor::TwapExecutor;
pub use vwap_executor::VwapExecutor;
