//! Bounded-channel event publisher.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{EventPublisherPort, TradingEvent};
use crate::observability::record_event_dropped;

/// Forwards events into a bounded channel with `try_send`.
///
/// A full or closed channel drops the event, counts it and logs a warning;
/// the trading path never waits on the consumer.
#[derive(Debug)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<TradingEvent>,
    dropped: AtomicU64,
}

impl ChannelEventPublisher {
    /// Create a publisher and the receiving end of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TradingEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    /// Events dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventPublisherPort for ChannelEventPublisher {
    fn publish(&self, event: TradingEvent) {
        let kind = event.kind();
        let reason = match self.sender.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Full(_)) => "full",
            Err(TrySendError::Closed(_)) => "closed",
        };

        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        record_event_dropped(kind, reason);
        tracing::warn!(kind, reason, dropped, "Event sink unavailable, dropping event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consensus::{ConsensusDecision, HoldReason};
    use crate::domain::shared::Symbol;

    fn event() -> TradingEvent {
        TradingEvent::Decision(ConsensusDecision::hold(
            Symbol::new("AAPL"),
            HoldReason::NoOpinions,
            vec![],
        ))
    }

    #[tokio::test]
    async fn delivers_while_capacity_remains() {
        let (publisher, mut receiver) = ChannelEventPublisher::new(4);
        publisher.publish(event());
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.kind(), "decision");
        assert_eq!(publisher.dropped(), 0);
    }

    #[test]
    fn drops_when_full_without_blocking() {
        let (publisher, _receiver) = ChannelEventPublisher::new(1);
        publisher.publish(event());
        publisher.publish(event());
        publisher.publish(event());
        assert_eq!(publisher.dropped(), 2);
    }

    #[test]
    fn drops_when_closed() {
        let (publisher, receiver) = ChannelEventPublisher::new(8);
        drop(receiver);
        publisher.publish(event());
        assert_eq!(publisher.dropped(), 1);
    }
}
