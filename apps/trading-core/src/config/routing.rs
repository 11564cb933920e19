//! Routing configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::routing::VenuePreferenceTable;
use crate::domain::shared::{SymbolClass, VenueId};

/// Venue preference per symbol class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Primary venue per class.
    #[serde(default = "default_primary")]
    pub primary: HashMap<SymbolClass, String>,
    /// Fallback venues, tried in order.
    #[serde(default = "default_fallback")]
    pub fallback: Vec<String>,
    /// Venues tried ahead of the table for every order.
    #[serde(default)]
    pub preference: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            fallback: default_fallback(),
            preference: Vec::new(),
        }
    }
}

impl RoutingConfig {
    /// Build the preference table.
    #[must_use]
    pub fn to_preference_table(&self) -> VenuePreferenceTable {
        let mut table = VenuePreferenceTable::new();
        for (class, venue) in &self.primary {
            table = table.with_primary(*class, venue.as_str());
        }
        for venue in &self.fallback {
            table = table.with_fallback(venue.as_str());
        }
        table
    }

    /// Explicit venue preference.
    #[must_use]
    pub fn venue_preference(&self) -> Vec<VenueId> {
        self.preference
            .iter()
            .map(|venue| VenueId::new(venue.as_str()))
            .collect()
    }

    /// Every venue id the routing section mentions.
    pub(super) fn referenced_venues(&self) -> impl Iterator<Item = &str> {
        self.primary
            .values()
            .chain(&self.fallback)
            .chain(&self.preference)
            .map(String::as_str)
    }
}

fn default_primary() -> HashMap<SymbolClass, String> {
    HashMap::from([
        (SymbolClass::Equity, "alpaca".to_string()),
        (SymbolClass::Option, "ibkr".to_string()),
        (SymbolClass::Crypto, "coinbase".to_string()),
    ])
}

fn default_fallback() -> Vec<String> {
    vec!["alpaca".to_string(), "ibkr".to_string()]
}
