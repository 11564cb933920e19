//! Routing Errors

use thiserror::Error;

use crate::domain::shared::{Symbol, VenueId};

/// Errors raised while routing an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The decision was HOLD.
    #[error("Nothing to route for {symbol}: decision is HOLD")]
    NothingToRoute {
        /// Instrument.
        symbol: Symbol,
    },

    /// Every candidate venue was refused by its circuit breaker.
    #[error("No available venue for {symbol} ({} excluded)", .excluded.len())]
    NoAvailableVenue {
        /// Instrument.
        symbol: Symbol,
        /// Venues that were considered and excluded.
        excluded: Vec<VenueId>,
    },
}
