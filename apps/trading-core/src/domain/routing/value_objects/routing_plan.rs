//! Routing plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::execution_tactics::value_objects::OrderSide;
use crate::domain::shared::{Symbol, VenueId};
use crate::resilience::CircuitState;

/// A venue admitted by the router, with the breaker state seen at routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCandidate {
    /// Venue.
    pub venue: VenueId,
    /// Breaker state when the plan was computed (CLOSED or HALF_OPEN).
    pub state: CircuitState,
}

/// Ordered venues to try for one order. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPlan {
    /// Instrument.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Venues to try, best first. Never empty.
    pub candidates: Vec<RouteCandidate>,
    /// Venues skipped because their breaker refused traffic.
    pub excluded: Vec<VenueId>,
    /// Routing time.
    pub created_at: DateTime<Utc>,
}

impl RoutingPlan {
    /// First venue to try.
    #[must_use]
    pub fn primary(&self) -> Option<&VenueId> {
        self.candidates.first().map(|c| &c.venue)
    }

    /// Candidate venues in order.
    pub fn venues(&self) -> impl Iterator<Item = &VenueId> {
        self.candidates.iter().map(|c| &c.venue)
    }
}
