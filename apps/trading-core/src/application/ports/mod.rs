//! Application Ports (Driven)
//!
//! Ports define how the core uses external systems.

mod event_publisher_port;
mod market_data_port;
mod venue_port;

pub use event_publisher_port::{EventPublisherPort, NoOpEventPublisher, TradingEvent};
pub use market_data_port::{MarketDataError, MarketDataPort};
pub use venue_port::{VenueAck, VenueError, VenueOrderRequest, VenueOrderStatus, VenuePort};
