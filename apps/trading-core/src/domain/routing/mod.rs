//! Routing Bounded Context
//!
//! Picks the ordered list of venues a child order may be sent to, skipping
//! venues whose circuit breaker refuses traffic.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::RoutingError;
pub use services::PlatformRouter;
pub use value_objects::{RouteCandidate, RoutingPlan, VenuePreferenceTable};
