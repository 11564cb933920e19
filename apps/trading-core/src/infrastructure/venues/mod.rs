//! Venue adapters.

mod paper;

pub use paper::{PaperVenue, PaperVenueConfig};
