//! Execution Tactics Bounded Context
//!
//! Turns an approved parent order into an [`ExecutionPlan`]: a MARKET, TWAP,
//! VWAP, ICEBERG or SNIPER schedule of child-order slices whose sizes sum to
//! the parent total. Running the plan lives in the application layer.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::TacticError;
pub use services::{
    IcebergExecutor, TacticSelector, TwapExecutor, VwapExecutor, SIZE_DP, build_plan, round_to_lot,
};
pub use value_objects::{
    AlgorithmKind, ChildOrder, ExecutionOutcome, ExecutionParams, ExecutionPlan, ExecutionStatus,
    IcebergConfig, IcebergPeak, OrderKind, OrderSide, ParentOrder, PartialExecutionFailure,
    PlannedSlice, SliceReport, SliceStatus, SliceType, SniperConfig, TacticSelectionContext,
    TacticUrgency, TwapConfig, VwapConfig,
};
