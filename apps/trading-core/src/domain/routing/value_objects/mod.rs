//! Routing value objects.

mod preference_table;
mod routing_plan;

pub use preference_table::VenuePreferenceTable;
pub use routing_plan::{RouteCandidate, RoutingPlan};
