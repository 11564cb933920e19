//! Execution Tactics Value Objects

mod algorithm_kind;
mod execution_params;
mod execution_plan;
mod iceberg_config;
mod order;
mod outcome;
mod selection_context;
mod slices;
mod sniper_config;
mod twap_config;
mod vwap_config;

pub use algorithm_kind::AlgorithmKind;
pub use execution_params::ExecutionParams;
pub use execution_plan::{ExecutionPlan, ExecutionStatus};
pub use iceberg_config::IcebergConfig;
pub use order::{ChildOrder, OrderKind, OrderSide, ParentOrder};
pub use outcome::{ExecutionOutcome, PartialExecutionFailure, SliceReport, SliceStatus};
pub use selection_context::{TacticSelectionContext, TacticUrgency};
pub use slices::{IcebergPeak, PlannedSlice, SliceType};
pub use sniper_config::SniperConfig;
pub use twap_config::TwapConfig;
pub use vwap_config::VwapConfig;
