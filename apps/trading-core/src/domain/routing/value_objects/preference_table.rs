//! Venue preferences per instrument class.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::shared::{SymbolClass, VenueId};

/// Primary venue per symbol class, then a fixed fallback sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenuePreferenceTable {
    /// Primary venue per class.
    #[serde(default)]
    pub primary: HashMap<SymbolClass, VenueId>,
    /// Fallback venues tried in order after the primary.
    #[serde(default)]
    pub fallback: Vec<VenueId>,
}

impl VenuePreferenceTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary venue for a class.
    #[must_use]
    pub fn with_primary(mut self, class: SymbolClass, venue: impl Into<VenueId>) -> Self {
        self.primary.insert(class, venue.into());
        self
    }

    /// Append a fallback venue.
    #[must_use]
    pub fn with_fallback(mut self, venue: impl Into<VenueId>) -> Self {
        self.fallback.push(venue.into());
        self
    }

    /// Candidate order for a class: explicit preference, primary, fallbacks,
    /// without duplicates.
    #[must_use]
    pub fn candidates(&self, class: SymbolClass, preference: &[VenueId]) -> Vec<VenueId> {
        let mut ordered: Vec<VenueId> = Vec::new();
        let chain = preference
            .iter()
            .chain(self.primary.get(&class))
            .chain(self.fallback.iter());
        for venue in chain {
            if !ordered.contains(venue) {
                ordered.push(venue.clone());
            }
        }
        ordered
    }

    /// Every venue the table mentions.
    #[must_use]
    pub fn venues(&self) -> Vec<VenueId> {
        let mut all: Vec<VenueId> = self.primary.values().cloned().collect();
        all.extend(self.fallback.iter().cloned());
        all.sort();
        all.dedup();
        all
    }
}
