//! Event publisher adapters.

mod channel;
mod logging;

pub use channel::ChannelEventPublisher;
pub use logging::LoggingEventPublisher;
