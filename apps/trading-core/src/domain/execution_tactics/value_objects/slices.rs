//! Execution Slice Value Objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::OrderKind;

/// Order type used for each slice of a sliced algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceType {
    /// Use limit orders for each slice.
    Limit,
    /// Use market orders for each slice.
    Market,
}

impl SliceType {
    /// Order kind for slices of this type.
    #[must_use]
    pub const fn order_kind(&self) -> OrderKind {
        match self {
            Self::Limit => OrderKind::Limit,
            Self::Market => OrderKind::Market,
        }
    }

    /// Planned slice of this type; limit slices rest at `price` for up to
    /// `resting_timeout`.
    #[must_use]
    pub const fn planned(
        &self,
        index: usize,
        size: Decimal,
        offset: Duration,
        price: Decimal,
        resting_timeout: Duration,
    ) -> PlannedSlice {
        match self {
            Self::Limit => PlannedSlice::limit(index, size, offset, price, resting_timeout),
            Self::Market => PlannedSlice::market(index, size, offset),
        }
    }
}

/// One pre-perturbation slice of an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSlice {
    /// Slice number (0-indexed, dispatch order).
    pub index: usize,
    /// Planned size.
    pub size: Decimal,
    /// Offset from plan start at which the slice fires.
    pub offset: Duration,
    /// Market or limit.
    pub kind: OrderKind,
    /// Limit price for limit slices.
    pub limit_price: Option<Decimal>,
    /// How long a resting limit slice may wait for fills before cancellation.
    pub resting_timeout: Option<Duration>,
}

impl PlannedSlice {
    /// Create a market slice.
    #[must_use]
    pub const fn market(index: usize, size: Decimal, offset: Duration) -> Self {
        Self {
            index,
            size,
            offset,
            kind: OrderKind::Market,
            limit_price: None,
            resting_timeout: None,
        }
    }

    /// Create a resting limit slice.
    #[must_use]
    pub const fn limit(
        index: usize,
        size: Decimal,
        offset: Duration,
        price: Decimal,
        resting_timeout: Duration,
    ) -> Self {
        Self {
            index,
            size,
            offset,
            kind: OrderKind::Limit,
            limit_price: Some(price),
            resting_timeout: Some(resting_timeout),
        }
    }
}

/// A single Iceberg execution slice (the visible "peak").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcebergPeak {
    /// Quantity for this peak.
    pub quantity: Decimal,
    /// Peak number.
    pub peak_number: usize,
}

impl IcebergPeak {
    /// Create a new iceberg peak.
    #[must_use]
    pub const fn new(quantity: Decimal, peak_number: usize) -> Self {
        Self {
            quantity,
            peak_number,
        }
    }
}
