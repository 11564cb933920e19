//! Venue Port (Driven Port)
//!
//! Interface for placing, cancelling and polling orders at one execution
//! venue.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::execution_tactics::value_objects::{ChildOrder, OrderKind, OrderSide};
use crate::domain::shared::{ChildOrderId, Symbol, VenueId, VenueOrderId};

/// Order as sent to a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueOrderRequest {
    /// Client order ID.
    pub client_order_id: ChildOrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Market or limit.
    pub kind: OrderKind,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price (for limit orders).
    pub limit_price: Option<Decimal>,
}

impl VenueOrderRequest {
    /// Request for a child order.
    #[must_use]
    pub fn from_child(child: &ChildOrder) -> Self {
        Self {
            client_order_id: child.id.clone(),
            symbol: child.symbol.clone(),
            side: child.side,
            kind: child.kind,
            quantity: child.size,
            limit_price: child.limit_price,
        }
    }
}

/// Order status reported by a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueOrderStatus {
    /// Working, nothing filled yet.
    Accepted,
    /// Working with some size filled.
    PartiallyFilled,
    /// Fully filled.
    Filled,
    /// Refused by the venue.
    Rejected,
    /// Cancelled; `filled_size` holds whatever filled before.
    Cancelled,
}

impl VenueOrderStatus {
    /// Whether the order can still fill.
    #[must_use]
    pub const fn is_working(&self) -> bool {
        matches!(self, Self::Accepted | Self::PartiallyFilled)
    }
}

impl fmt::Display for VenueOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Acknowledgment or status report from a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueAck {
    /// Venue-assigned order ID.
    pub venue_order_id: VenueOrderId,
    /// Current status.
    pub status: VenueOrderStatus,
    /// Filled quantity.
    pub filled_size: Decimal,
    /// Average fill price (if any).
    pub avg_fill_price: Option<Decimal>,
    /// Rejection reason.
    pub reason: Option<String>,
}

impl VenueAck {
    /// Ack for a working order with nothing filled.
    #[must_use]
    pub const fn accepted(venue_order_id: VenueOrderId) -> Self {
        Self {
            venue_order_id,
            status: VenueOrderStatus::Accepted,
            filled_size: Decimal::ZERO,
            avg_fill_price: None,
            reason: None,
        }
    }

    /// Ack for a fill.
    #[must_use]
    pub const fn filled(venue_order_id: VenueOrderId, size: Decimal, price: Decimal) -> Self {
        Self {
            venue_order_id,
            status: VenueOrderStatus::Filled,
            filled_size: size,
            avg_fill_price: Some(price),
            reason: None,
        }
    }

    /// Ack for a rejection.
    #[must_use]
    pub fn rejected(venue_order_id: VenueOrderId, reason: impl Into<String>) -> Self {
        Self {
            venue_order_id,
            status: VenueOrderStatus::Rejected,
            filled_size: Decimal::ZERO,
            avg_fill_price: None,
            reason: Some(reason.into()),
        }
    }
}

/// Venue port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VenueError {
    /// Connection error.
    #[error("Venue connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// Order rejected by the venue.
    #[error("Order rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// Rate limited.
    #[error("Rate limited by venue")]
    RateLimited,

    /// Unknown error.
    #[error("Venue error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for one execution venue.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Venue identifier.
    fn venue_id(&self) -> &VenueId;

    /// Place an order.
    async fn place_order(&self, request: VenueOrderRequest) -> Result<VenueAck, VenueError>;

    /// Cancel a working order.
    async fn cancel_order(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError>;

    /// Get order status.
    async fn order_status(&self, venue_order_id: &VenueOrderId) -> Result<VenueAck, VenueError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::PlanId;
    use rust_decimal_macros::dec;

    #[test]
    fn request_from_child_copies_order_terms() {
        let child = ChildOrder::new(
            PlanId::new("plan-1"),
            0,
            Symbol::new("AAPL"),
            OrderSide::Sell,
            dec!(12),
            OrderKind::Limit,
            Some(dec!(101.25)),
        );
        let request = VenueOrderRequest::from_child(&child);
        assert_eq!(request.client_order_id, child.id);
        assert_eq!(request.quantity, dec!(12));
        assert_eq!(request.limit_price, Some(dec!(101.25)));
        assert_eq!(request.kind, OrderKind::Limit);
    }

    #[test]
    fn working_statuses() {
        assert!(VenueOrderStatus::Accepted.is_working());
        assert!(VenueOrderStatus::PartiallyFilled.is_working());
        assert!(!VenueOrderStatus::Filled.is_working());
        assert!(!VenueOrderStatus::Cancelled.is_working());
    }

    #[test]
    fn status_serde() {
        let json = serde_json::to_string(&VenueOrderStatus::PartiallyFilled).unwrap();
        assert_eq!(json, "\"PARTIALLY_FILLED\"");
    }
}
