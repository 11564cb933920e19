//! Parent and child orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::shared::{ChildOrderId, DomainError, PlanId, Symbol, VenueId};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order kind sent to a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Execute immediately at the best available price.
    Market,
    /// Rest at a limit price.
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

/// The approved order an execution plan works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentOrder {
    /// Instrument.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Total size to execute.
    pub total_size: Decimal,
    /// Reference price (last trade) used to derive limit prices.
    pub reference_price: Decimal,
    /// Explicit limit price for limit-style slices.
    pub limit_price: Option<Decimal>,
}

impl ParentOrder {
    /// Create a parent order, validating size and reference price.
    pub fn new(
        symbol: Symbol,
        side: OrderSide,
        total_size: Decimal,
        reference_price: Decimal,
    ) -> Result<Self, DomainError> {
        if total_size <= Decimal::ZERO {
            return Err(DomainError::InvalidValue {
                field: "total_size".to_string(),
                message: format!("must be positive, got {total_size}"),
            });
        }
        if reference_price < Decimal::ZERO {
            return Err(DomainError::InvalidValue {
                field: "reference_price".to_string(),
                message: format!("must not be negative, got {reference_price}"),
            });
        }
        Ok(Self {
            symbol,
            side,
            total_size,
            reference_price,
            limit_price: None,
        })
    }

    /// Set an explicit limit price.
    #[must_use]
    pub const fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    /// Limit price for resting slices: explicit limit, else the reference price.
    #[must_use]
    pub fn resting_price(&self) -> Decimal {
        self.limit_price.unwrap_or(self.reference_price)
    }
}

/// One child order cut from an execution plan slice.
///
/// Traces back to exactly one plan (and through it one parent order) via
/// `plan_id` and `slice_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOrder {
    /// Client-side identifier.
    pub id: ChildOrderId,
    /// Owning plan.
    pub plan_id: PlanId,
    /// Index of the planned slice this order was cut from.
    pub slice_index: usize,
    /// Instrument.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Size to send.
    pub size: Decimal,
    /// Market or limit.
    pub kind: OrderKind,
    /// Limit price for limit orders.
    pub limit_price: Option<Decimal>,
    /// Target venue, set once routed.
    pub venue: Option<VenueId>,
    /// Delay to wait before dispatch.
    pub submit_delay: Duration,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ChildOrder {
    /// Create a child order with no venue and no submit delay.
    #[must_use]
    pub fn new(
        plan_id: PlanId,
        slice_index: usize,
        symbol: Symbol,
        side: OrderSide,
        size: Decimal,
        kind: OrderKind,
        limit_price: Option<Decimal>,
    ) -> Self {
        Self {
            id: ChildOrderId::generate(),
            plan_id,
            slice_index,
            symbol,
            side,
            size,
            kind,
            limit_price,
            venue: None,
            submit_delay: Duration::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Whether the order rests on the book.
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        matches!(self.kind, OrderKind::Limit)
    }

    /// Assign the venue.
    #[must_use]
    pub fn with_venue(mut self, venue: VenueId) -> Self {
        self.venue = Some(venue);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_side_serde() {
        let json = serde_json::to_string(&OrderSide::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
    }

    #[test]
    fn parent_order_rejects_non_positive_size() {
        let result = ParentOrder::new(Symbol::new("AAPL"), OrderSide::Buy, dec!(0), dec!(100));
        assert!(matches!(result, Err(DomainError::InvalidValue { .. })));
    }

    #[test]
    fn parent_order_resting_price() {
        let order =
            ParentOrder::new(Symbol::new("AAPL"), OrderSide::Buy, dec!(10), dec!(100)).unwrap();
        assert_eq!(order.resting_price(), dec!(100));

        let order = order.with_limit_price(dec!(99.5));
        assert_eq!(order.resting_price(), dec!(99.5));
    }

    #[test]
    fn child_order_new() {
        let child = ChildOrder::new(
            PlanId::new("plan-1"),
            2,
            Symbol::new("AAPL"),
            OrderSide::Buy,
            dec!(5),
            OrderKind::Limit,
            Some(dec!(100)),
        );
        assert!(child.is_limit());
        assert!(child.venue.is_none());
        assert_eq!(child.submit_delay, Duration::ZERO);

        let child = child.with_venue(VenueId::new("alpaca"));
        assert_eq!(child.venue, Some(VenueId::new("alpaca")));
    }
}
