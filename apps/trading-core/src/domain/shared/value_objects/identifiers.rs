//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(VenueId, "Identifier of an execution venue (exchange or broker).");
define_id!(AgentId, "Identifier of a signal agent.");
define_id!(PlanId, "Unique identifier for an execution plan.");
define_id!(ChildOrderId, "Unique identifier for a child order (client side).");
define_id!(VenueOrderId, "Venue-assigned identifier for a placed order.");
define_id!(CycleId, "Unique identifier for a trading cycle.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_id_new_and_display() {
        let id = VenueId::new("binance");
        assert_eq!(id.as_str(), "binance");
        assert_eq!(format!("{id}"), "binance");
    }

    #[test]
    fn plan_id_generate_is_unique() {
        let id1 = PlanId::generate();
        let id2 = PlanId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn agent_id_from_string() {
        let id: AgentId = "momentum".into();
        assert_eq!(id.as_str(), "momentum");

        let id: AgentId = String::from("trend").into();
        assert_eq!(id.as_str(), "trend");
    }

    #[test]
    fn child_order_id_into_inner() {
        let id = ChildOrderId::new("child-1");
        assert_eq!(id.into_inner(), "child-1");
    }

    #[test]
    fn venue_id_serde_is_transparent() {
        let id = VenueId::new("kraken");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"kraken\"");
    }
}
