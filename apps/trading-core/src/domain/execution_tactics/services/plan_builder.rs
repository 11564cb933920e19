//! Execution plan construction.

use rust_decimal::Decimal;
use std::time::Duration;

use super::{IcebergExecutor, TwapExecutor, VwapExecutor};
use crate::domain::execution_tactics::TacticError;
use crate::domain::execution_tactics::value_objects::{
    AlgorithmKind, ExecutionParams, ExecutionPlan, ParentOrder, PlannedSlice,
};

/// Build the full pre-perturbation schedule for `order` under `algorithm`.
///
/// Planned sizes always sum exactly to the parent total; the final slice
/// absorbs rounding and lot remainders. Slices that round to zero are dropped
/// and the survivors re-indexed.
pub fn build_plan(
    order: ParentOrder,
    algorithm: AlgorithmKind,
    params: &ExecutionParams,
) -> Result<ExecutionPlan, TacticError> {
    let total = order.total_size;
    if total <= Decimal::ZERO {
        return Err(TacticError::InvalidQuantity { size: total });
    }
    if let Some(lot) = params.lot_size {
        if lot <= Decimal::ZERO {
            return Err(TacticError::invalid(
                algorithm,
                format!("lot size must be positive, got {lot}"),
            ));
        }
    }

    let price = order.resting_price();
    let slices: Vec<PlannedSlice> = match algorithm {
        AlgorithmKind::Market => vec![PlannedSlice::market(0, total, Duration::ZERO)],
        AlgorithmKind::Twap => {
            let config = &params.twap;
            if config.slice_count == 0 {
                return Err(TacticError::invalid(
                    algorithm,
                    "slice count must be positive",
                ));
            }
            if config.slice_count > 1 && config.window_seconds == 0 {
                return Err(TacticError::invalid(
                    algorithm,
                    "window must be positive when slicing",
                ));
            }
            TwapExecutor::new(
                total,
                config.clone(),
                params.lot_size,
                price,
                params.fill_timeout(),
            )
            .collect()
        }
        AlgorithmKind::Vwap => {
            let curve = params.vwap.normalized_curve()?;
            VwapExecutor::new(
                total,
                curve,
                params.vwap.bucket_offsets(),
                params.lot_size,
                params.vwap.slice_type,
                price,
                params.fill_timeout(),
            )
            .collect()
        }
        AlgorithmKind::Iceberg => {
            let config = &params.iceberg;
            let executor = IcebergExecutor::new(total, config.clone(), params.lot_size);
            if executor.display_qty() <= Decimal::ZERO {
                return Err(TacticError::invalid(
                    algorithm,
                    format!(
                        "visible size {} is not positive after lot rounding",
                        config.visible_size
                    ),
                ));
            }
            executor
                .planned_peaks()
                .into_iter()
                .map(|peak| {
                    let nominal = config.min_interval() * peak.peak_number as u32;
                    PlannedSlice::limit(
                        peak.peak_number,
                        peak.quantity,
                        nominal,
                        price,
                        config.peak_timeout(),
                    )
                })
                .collect()
        }
        AlgorithmKind::Sniper => {
            let target = params
                .sniper
                .target_price
                .or(order.limit_price)
                .unwrap_or(order.reference_price);
            if target <= Decimal::ZERO {
                return Err(TacticError::invalid(
                    algorithm,
                    "target price must be positive",
                ));
            }
            vec![PlannedSlice::limit(
                0,
                total,
                Duration::ZERO,
                target,
                params.sniper.expiry(),
            )]
        }
    };

    let slices: Vec<PlannedSlice> = slices
        .into_iter()
        .filter(|s| s.size > Decimal::ZERO)
        .enumerate()
        .map(|(index, slice)| PlannedSlice { index, ..slice })
        .collect();

    let planned: Decimal = slices.iter().map(|s| s.size).sum();
    if planned != total {
        return Err(TacticError::PlanMismatch { planned, total });
    }

    let iceberg = (algorithm == AlgorithmKind::Iceberg).then(|| params.iceberg.clone());
    ExecutionPlan::new(order, algorithm, slices, iceberg, params.lot_size)
        .map_err(|_| TacticError::PlanMismatch { planned, total })
}
