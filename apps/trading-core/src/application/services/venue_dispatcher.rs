//! Venue dispatch with per-venue timeouts and breaker accounting.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{VenueAck, VenueError, VenueOrderRequest, VenueOrderStatus, VenuePort};
use crate::domain::execution_tactics::value_objects::ChildOrder;
use crate::domain::routing::RoutingPlan;
use crate::domain::shared::{Symbol, VenueId, VenueOrderId};
use crate::observability::record_venue_attempt;
use crate::resilience::CircuitBreaker;

/// Default bound on a single venue call.
pub const DEFAULT_VENUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Why one venue attempt did not produce a working order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptFailure {
    /// Transport or venue-side error.
    Transport {
        /// Error details.
        message: String,
    },
    /// No response within the venue timeout.
    TransportTimeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },
    /// The venue refused the order.
    Rejected {
        /// Rejection reason.
        reason: String,
    },
    /// The breaker stopped admitting requests after routing.
    CircuitUnavailable,
    /// No adapter is registered for the venue.
    UnknownVenue,
}

impl AttemptFailure {
    /// Whether this failure is reported to the venue's breaker.
    #[must_use]
    pub const fn counts_against_venue(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::TransportTimeout { .. } | Self::Rejected { .. }
        )
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::TransportTimeout { .. } => "timeout",
            Self::Rejected { .. } => "rejected",
            Self::CircuitUnavailable => "circuit_unavailable",
            Self::UnknownVenue => "unknown_venue",
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "transport error: {message}"),
            Self::TransportTimeout { timeout_ms } => write!(f, "timed out after {timeout_ms}ms"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
            Self::CircuitUnavailable => write!(f, "circuit breaker not admitting requests"),
            Self::UnknownVenue => write!(f, "no adapter registered"),
        }
    }
}

/// One venue tried while dispatching a child order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueAttempt {
    /// Venue tried.
    pub venue: VenueId,
    /// Why it failed.
    pub failure: AttemptFailure,
}

/// Dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Every routed venue failed.
    #[error("All venues failed for {size} {symbol}: {}", summarize(.attempts))]
    VenuesExhausted {
        /// Instrument.
        symbol: Symbol,
        /// Child order size.
        size: Decimal,
        /// Each venue's failure in the order tried.
        attempts: Vec<VenueAttempt>,
    },

    /// No adapter registered for a venue.
    #[error("Unknown venue: {venue}")]
    UnknownVenue {
        /// The venue.
        venue: VenueId,
    },

    /// A status or cancel call failed.
    #[error("{operation} at {venue} failed: {source}")]
    Venue {
        /// The venue.
        venue: VenueId,
        /// `order_status` or `cancel_order`.
        operation: &'static str,
        /// Underlying error.
        source: VenueError,
    },

    /// A status or cancel call timed out.
    #[error("{operation} at {venue} timed out")]
    Timeout {
        /// The venue.
        venue: VenueId,
        /// `order_status` or `cancel_order`.
        operation: &'static str,
    },

    /// Cancelled before any venue accepted the order.
    #[error("Dispatch of {size} {symbol} cancelled after {} failed attempts", .attempts.len())]
    Cancelled {
        /// Instrument.
        symbol: Symbol,
        /// Child order size.
        size: Decimal,
        /// Venues that failed before cancellation.
        attempts: Vec<VenueAttempt>,
    },
}

fn summarize(attempts: &[VenueAttempt]) -> String {
    if attempts.is_empty() {
        return "no venues tried".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.venue, a.failure))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A child order accepted by a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedOrder {
    /// The child order, with its venue set.
    pub child: ChildOrder,
    /// Venue acknowledgment.
    pub ack: VenueAck,
    /// Venues that failed before this one.
    pub failed_attempts: Vec<VenueAttempt>,
}

impl DispatchedOrder {
    /// Venue that accepted the order.
    #[must_use]
    pub fn venue(&self) -> Option<&VenueId> {
        self.child.venue.as_ref()
    }
}

/// Registered venue adapter with its call timeout.
#[derive(Clone)]
pub struct VenueEndpoint {
    port: Arc<dyn VenuePort>,
    timeout: Duration,
}

impl fmt::Debug for VenueEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueEndpoint")
            .field("venue", self.port.venue_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Venue adapters keyed by venue.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    venues: HashMap<VenueId, VenueEndpoint>,
}

impl VenueRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own venue id.
    pub fn register(&mut self, port: Arc<dyn VenuePort>, timeout: Duration) {
        let venue = port.venue_id().clone();
        self.venues.insert(venue, VenueEndpoint { port, timeout });
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with_venue(mut self, port: Arc<dyn VenuePort>, timeout: Duration) -> Self {
        self.register(port, timeout);
        self
    }

    /// Registered venue ids, sorted.
    #[must_use]
    pub fn venue_ids(&self) -> Vec<VenueId> {
        let mut ids: Vec<VenueId> = self.venues.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered venues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Whether no venue is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    fn get(&self, venue: &VenueId) -> Option<&VenueEndpoint> {
        self.venues.get(venue)
    }
}

/// Sends child orders to venues in routing order.
///
/// Every `place_order` outcome is recorded into the venue's breaker exactly
/// once: acceptance as success, error, timeout or rejection as failure.
#[derive(Debug, Clone)]
pub struct VenueDispatcher {
    registry: VenueRegistry,
    breaker: Arc<CircuitBreaker>,
}

impl VenueDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new(registry: VenueRegistry, breaker: Arc<CircuitBreaker>) -> Self {
        Self { registry, breaker }
    }

    /// Registered venues.
    #[must_use]
    pub const fn registry(&self) -> &VenueRegistry {
        &self.registry
    }

    /// Place a child order, trying each candidate venue until one accepts.
    ///
    /// # Errors
    ///
    /// `VenuesExhausted` when no candidate accepted the order.
    pub async fn dispatch(
        &self,
        child: ChildOrder,
        plan: &RoutingPlan,
    ) -> Result<DispatchedOrder, DispatchError> {
        self.dispatch_until(child, plan, &CancellationToken::new())
            .await
    }

    /// Like [`dispatch`](Self::dispatch), but stops before the next venue
    /// once `token` is cancelled.
    ///
    /// A `place_order` already in flight always runs to completion (bounded
    /// by the venue timeout) and is recorded into the breaker, so an accepted
    /// order is always returned to the caller to be cancelled or settled.
    ///
    /// # Errors
    ///
    /// `Cancelled` when the token fired before any venue accepted,
    /// `VenuesExhausted` when no candidate accepted the order.
    pub async fn dispatch_until(
        &self,
        child: ChildOrder,
        plan: &RoutingPlan,
        token: &CancellationToken,
    ) -> Result<DispatchedOrder, DispatchError> {
        let mut attempts = Vec::new();

        for venue in plan.venues() {
            if token.is_cancelled() {
                return Err(DispatchError::Cancelled {
                    symbol: child.symbol,
                    size: child.size,
                    attempts,
                });
            }
            match self.try_venue(&child, venue).await {
                Ok(ack) => {
                    tracing::debug!(
                        venue = %venue,
                        symbol = %child.symbol,
                        size = %child.size,
                        child_id = %child.id,
                        venue_order_id = %ack.venue_order_id,
                        "Child order accepted"
                    );
                    return Ok(DispatchedOrder {
                        child: child.with_venue(venue.clone()),
                        ack,
                        failed_attempts: attempts,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        venue = %venue,
                        symbol = %child.symbol,
                        child_id = %child.id,
                        failure = %failure,
                        "Venue attempt failed"
                    );
                    attempts.push(VenueAttempt {
                        venue: venue.clone(),
                        failure,
                    });
                }
            }
        }

        Err(DispatchError::VenuesExhausted {
            symbol: child.symbol,
            size: child.size,
            attempts,
        })
    }

    async fn try_venue(&self, child: &ChildOrder, venue: &VenueId) -> Result<VenueAck, AttemptFailure> {
        let Some(endpoint) = self.registry.get(venue) else {
            record_venue_attempt(venue.as_str(), AttemptFailure::UnknownVenue.label());
            return Err(AttemptFailure::UnknownVenue);
        };
        let Some(permit) = self.breaker.try_acquire(venue) else {
            record_venue_attempt(venue.as_str(), AttemptFailure::CircuitUnavailable.label());
            return Err(AttemptFailure::CircuitUnavailable);
        };

        let request = VenueOrderRequest::from_child(child);
        let result =
            match tokio::time::timeout(endpoint.timeout, endpoint.port.place_order(request)).await {
                Ok(Ok(ack)) if ack.status == VenueOrderStatus::Rejected => {
                    Err(AttemptFailure::Rejected {
                        reason: ack.reason.unwrap_or_else(|| "no reason given".to_string()),
                    })
                }
                Ok(Ok(ack)) => Ok(ack),
                Ok(Err(VenueError::Rejected { reason })) => Err(AttemptFailure::Rejected { reason }),
                Ok(Err(e)) => Err(AttemptFailure::Transport {
                    message: e.to_string(),
                }),
                Err(_) => Err(AttemptFailure::TransportTimeout {
                    timeout_ms: endpoint.timeout.as_millis() as u64,
                }),
            };

        permit.record(result.is_ok());
        let label = match &result {
            Ok(_) => "accepted",
            Err(failure) => failure.label(),
        };
        record_venue_attempt(venue.as_str(), label);
        result
    }

    /// Current status of a placed order.
    ///
    /// # Errors
    ///
    /// Unknown venue, venue error or timeout.
    pub async fn poll_status(
        &self,
        venue: &VenueId,
        venue_order_id: &VenueOrderId,
    ) -> Result<VenueAck, DispatchError> {
        let endpoint = self.endpoint(venue)?;
        match tokio::time::timeout(endpoint.timeout, endpoint.port.order_status(venue_order_id))
            .await
        {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(source)) => Err(DispatchError::Venue {
                venue: venue.clone(),
                operation: "order_status",
                source,
            }),
            Err(_) => Err(DispatchError::Timeout {
                venue: venue.clone(),
                operation: "order_status",
            }),
        }
    }

    /// Best-effort cancel. The outcome is logged and returned, never retried.
    ///
    /// # Errors
    ///
    /// Unknown venue, venue error or timeout.
    pub async fn cancel(
        &self,
        venue: &VenueId,
        venue_order_id: &VenueOrderId,
    ) -> Result<(), DispatchError> {
        let endpoint = self.endpoint(venue)?;
        let result =
            match tokio::time::timeout(endpoint.timeout, endpoint.port.cancel_order(venue_order_id))
                .await
            {
                Ok(Ok(())) => Ok(()),
                Ok(Err(source)) => Err(DispatchError::Venue {
                    venue: venue.clone(),
                    operation: "cancel_order",
                    source,
                }),
                Err(_) => Err(DispatchError::Timeout {
                    venue: venue.clone(),
                    operation: "cancel_order",
                }),
            };

        match &result {
            Ok(()) => tracing::debug!(
                venue = %venue,
                venue_order_id = %venue_order_id,
                "Resting order cancelled"
            ),
            Err(e) => tracing::warn!(
                venue = %venue,
                venue_order_id = %venue_order_id,
                error = %e,
                "Cancel failed"
            ),
        }
        result
    }

    fn endpoint(&self, venue: &VenueId) -> Result<&VenueEndpoint, DispatchError> {
        self.registry
            .get(venue)
            .ok_or_else(|| DispatchError::UnknownVenue {
                venue: venue.clone(),
            })
    }
}
