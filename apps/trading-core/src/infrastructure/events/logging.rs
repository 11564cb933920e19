//! Event publisher that writes events to the log.

use crate::application::ports::{EventPublisherPort, TradingEvent};

/// Logs a one-line summary of every event at `info`, the full JSON at
/// `debug`.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl EventPublisherPort for LoggingEventPublisher {
    fn publish(&self, event: TradingEvent) {
        match &event {
            TradingEvent::Decision(d) => tracing::info!(
                event = event.kind(),
                symbol = %d.symbol,
                action = %d.action,
                confidence = d.confidence,
                "Trading event"
            ),
            TradingEvent::Routing(r) => tracing::info!(
                event = event.kind(),
                symbol = %r.symbol,
                primary = r.primary().map_or("-", |v| v.as_str()),
                candidates = r.candidates.len(),
                "Trading event"
            ),
            TradingEvent::PlanCreated(p) => tracing::info!(
                event = event.kind(),
                plan_id = %p.id(),
                algorithm = %p.algorithm(),
                slices = p.slices().len(),
                "Trading event"
            ),
            TradingEvent::ChildOrder(s) => tracing::info!(
                event = event.kind(),
                plan_id = %s.plan_id,
                slice = s.slice_index,
                filled = %s.filled_size,
                "Trading event"
            ),
            TradingEvent::PlanFinished(o) => tracing::info!(
                event = event.kind(),
                plan_id = %o.plan_id,
                status = %o.status,
                filled = %o.filled,
                "Trading event"
            ),
            TradingEvent::BreakerTransition(t) => tracing::info!(
                event = event.kind(),
                venue = %t.venue,
                from = %t.from,
                to = %t.to,
                "Trading event"
            ),
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!(event = %json, "Trading event payload"),
                Err(e) => tracing::debug!(error = %e, "Trading event not serializable"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consensus::{ConsensusDecision, HoldReason};
    use crate::domain::shared::Symbol;

    #[test]
    fn logs_without_subscriber() {
        LoggingEventPublisher.publish(TradingEvent::Decision(ConsensusDecision::hold(
            Symbol::new("AAPL"),
            HoldReason::BelowThreshold,
            vec![],
        )));
    }
}
