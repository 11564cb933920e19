//! Per-venue circuit breakers.
//!
//! Stops order flow to a venue that keeps failing, then probes it back to
//! health. One [`VenueHealth`] record exists per venue, owned by the
//! [`CircuitBreaker`] and mutated only through the rules below.
//!
//! # State Machine
//!
//! ```text
//! CLOSED    → OPEN       (failure_threshold consecutive failures)
//! OPEN      → HALF_OPEN  (cooldown elapsed, observed by the next check or report)
//! HALF_OPEN → CLOSED     (recovery_successes consecutive probe successes)
//! HALF_OPEN → OPEN       (any failure, cooldown restarts)
//! ```
//!
//! HALF_OPEN admits one probe at a time. Callers that want the probe slot
//! claim it with [`CircuitBreaker::try_acquire`] and report through the
//! returned [`CallPermit`]; dropping an unrecorded permit frees the slot.
//!
//! # Example
//!
//! ```rust,ignore
//! use trading_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());
//! if let Some(permit) = breaker.try_acquire(&venue) {
//!     let ok = place_order().await.is_ok();
//!     permit.record(ok);
//! } else {
//!     // Circuit is open, fail fast
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::domain::shared::VenueId;
use crate::observability::record_circuit_state;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Healthy, requests pass through.
    Closed,
    /// Suspended, requests fail fast.
    Open,
    /// Probing with one trial request at a time.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed circuit.
    pub failure_threshold: u32,
    /// Time an open circuit waits before probing.
    pub cooldown: Duration,
    /// Consecutive probe successes that close a half-open circuit.
    pub recovery_successes: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
            recovery_successes: 3,
        }
    }
}

/// A state change, reported to logs, metrics and the transition listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerTransition {
    /// Venue whose circuit changed.
    pub venue: VenueId,
    /// Previous state.
    pub from: CircuitState,
    /// New state.
    pub to: CircuitState,
    /// Wall-clock time of the change.
    pub at: DateTime<Utc>,
}

/// Health record for one venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueHealth {
    venue: VenueId,
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_transition_at: Option<Instant>,
    probe_in_flight: bool,
    probe_generation: u64,
}

impl VenueHealth {
    fn new(venue: VenueId) -> Self {
        Self {
            venue,
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            last_transition_at: None,
            probe_in_flight: false,
            probe_generation: 0,
        }
    }

    /// Venue identifier.
    #[must_use]
    pub const fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CircuitState {
        self.state
    }

    /// Consecutive failures counted while CLOSED.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Consecutive probe successes counted while HALF_OPEN.
    #[must_use]
    pub const fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    /// Time of the last state change.
    #[must_use]
    pub const fn last_transition_at(&self) -> Option<Instant> {
        self.last_transition_at
    }

    /// Whether the HALF_OPEN probe slot is taken.
    #[must_use]
    pub const fn probe_in_flight(&self) -> bool {
        self.probe_in_flight
    }

    fn transition(&mut self, to: CircuitState, now: Instant) -> BreakerTransition {
        let from = self.state;
        self.state = to;
        self.consecutive_failures = 0;
        self.consecutive_successes = 0;
        self.probe_in_flight = false;
        self.last_transition_at = Some(now);
        BreakerTransition {
            venue: self.venue.clone(),
            from,
            to,
            at: Utc::now(),
        }
    }

    /// OPEN → HALF_OPEN once the cooldown has elapsed.
    fn refresh(&mut self, now: Instant, config: &CircuitBreakerConfig) -> Option<BreakerTransition> {
        if self.state != CircuitState::Open {
            return None;
        }
        let opened = self.last_transition_at?;
        if now.saturating_duration_since(opened) >= config.cooldown {
            return Some(self.transition(CircuitState::HalfOpen, now));
        }
        None
    }

    const fn admits_request(&self) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => !self.probe_in_flight,
            CircuitState::Open => false,
        }
    }

    fn record(
        &mut self,
        success: bool,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Option<BreakerTransition> {
        match self.state {
            CircuitState::Closed if success => {
                self.consecutive_failures = 0;
                None
            }
            CircuitState::Closed => {
                self.consecutive_failures += 1;
                (self.consecutive_failures >= config.failure_threshold)
                    .then(|| self.transition(CircuitState::Open, now))
            }
            CircuitState::HalfOpen if success => {
                self.probe_in_flight = false;
                self.consecutive_successes += 1;
                (self.consecutive_successes >= config.recovery_successes)
                    .then(|| self.transition(CircuitState::Closed, now))
            }
            CircuitState::HalfOpen => Some(self.transition(CircuitState::Open, now)),
            CircuitState::Open => {
                tracing::warn!(
                    venue = %self.venue,
                    success,
                    "Outcome recorded while circuit is OPEN, ignoring"
                );
                None
            }
        }
    }
}

/// Listener invoked after every state change.
pub type TransitionListener = Arc<dyn Fn(&BreakerTransition) + Send + Sync>;

/// Owned table of venue health records, one lock per venue.
#[derive(Debug, Default)]
struct VenueHealthTable {
    venues: RwLock<HashMap<VenueId, Arc<Mutex<VenueHealth>>>>,
}

impl VenueHealthTable {
    fn entry(&self, venue: &VenueId) -> Arc<Mutex<VenueHealth>> {
        if let Some(health) = self
            .venues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(venue)
        {
            return Arc::clone(health);
        }

        let mut venues = self.venues.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            venues
                .entry(venue.clone())
                .or_insert_with(|| Arc::new(Mutex::new(VenueHealth::new(venue.clone())))),
        )
    }

    fn all(&self) -> Vec<Arc<Mutex<VenueHealth>>> {
        self.venues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

/// Circuit breakers for every venue.
///
/// Shared as `Arc<CircuitBreaker>` between the router and the dispatcher.
/// Each public call takes the venue's lock once, so a transition is applied
/// atomically and concurrent outcome reports are never lost. Venues not yet
/// seen start CLOSED.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    table: VenueHealthTable,
    listener: Option<TransitionListener>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl CircuitBreaker {
    /// Create a breaker with an empty table.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            table: VenueHealthTable::default(),
            listener: None,
        }
    }

    /// Create a breaker with the given venues registered CLOSED.
    #[must_use]
    pub fn with_venues(
        config: CircuitBreakerConfig,
        venues: impl IntoIterator<Item = VenueId>,
    ) -> Self {
        let breaker = Self::new(config);
        for venue in venues {
            let _ = breaker.table.entry(&venue);
        }
        breaker
    }

    /// Attach a listener called after every transition.
    #[must_use]
    pub fn with_listener(mut self, listener: TransitionListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Whether the venue may receive a request now.
    ///
    /// True in CLOSED, and in HALF_OPEN while the probe slot is free. Does
    /// not claim the probe slot.
    #[must_use]
    pub fn is_available(&self, venue: &VenueId) -> bool {
        self.is_available_at(venue, Instant::now())
    }

    /// [`Self::is_available`] at an explicit instant.
    #[must_use]
    pub fn is_available_at(&self, venue: &VenueId, now: Instant) -> bool {
        self.with_health(venue, |health, config| {
            let transition = health.refresh(now, config);
            (health.admits_request(), transition)
        })
    }

    /// Claim permission for one request, taking the probe slot in HALF_OPEN.
    #[must_use]
    pub fn try_acquire(&self, venue: &VenueId) -> Option<CallPermit<'_>> {
        self.try_acquire_at(venue, Instant::now())
    }

    /// [`Self::try_acquire`] at an explicit instant.
    #[must_use]
    pub fn try_acquire_at(&self, venue: &VenueId, now: Instant) -> Option<CallPermit<'_>> {
        let probe = self.with_health(venue, |health, config| {
            let transition = health.refresh(now, config);
            let probe = match health.state {
                CircuitState::Closed => Some(None),
                CircuitState::HalfOpen if !health.probe_in_flight => {
                    health.probe_in_flight = true;
                    health.probe_generation += 1;
                    Some(Some(health.probe_generation))
                }
                _ => None,
            };
            (probe, transition)
        })?;

        Some(CallPermit {
            breaker: self,
            venue: venue.clone(),
            probe,
            recorded: false,
        })
    }

    /// Report the outcome of a request that bypassed [`Self::try_acquire`].
    pub fn record_outcome(&self, venue: &VenueId, success: bool) {
        self.record_outcome_at(venue, success, Instant::now());
    }

    /// [`Self::record_outcome`] at an explicit instant.
    pub fn record_outcome_at(&self, venue: &VenueId, success: bool, now: Instant) {
        let entry = self.table.entry(venue);
        let transitions = {
            let mut health = entry.lock().unwrap_or_else(PoisonError::into_inner);
            let refreshed = health.refresh(now, &self.config);
            let recorded = health.record(success, now, &self.config);
            [refreshed, recorded]
        };
        for transition in transitions.iter().flatten() {
            self.announce(transition);
        }
    }

    /// Current state, applying a due OPEN → HALF_OPEN transition.
    #[must_use]
    pub fn state(&self, venue: &VenueId) -> CircuitState {
        self.state_at(venue, Instant::now())
    }

    /// [`Self::state`] at an explicit instant.
    #[must_use]
    pub fn state_at(&self, venue: &VenueId, now: Instant) -> CircuitState {
        self.with_health(venue, |health, config| {
            let transition = health.refresh(now, config);
            (health.state, transition)
        })
    }

    /// Copy of one venue's health record.
    #[must_use]
    pub fn health(&self, venue: &VenueId) -> VenueHealth {
        self.with_health(venue, |health, _| (health.clone(), None))
    }

    /// Copies of every health record, ordered by venue.
    #[must_use]
    pub fn snapshot(&self) -> Vec<VenueHealth> {
        let mut records: Vec<VenueHealth> = self
            .table
            .all()
            .iter()
            .map(|h| h.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect();
        records.sort_by(|a, b| a.venue.cmp(&b.venue));
        records
    }

    fn release_probe(&self, venue: &VenueId, generation: u64) {
        self.with_health(venue, |health, _| {
            if health.state == CircuitState::HalfOpen
                && health.probe_in_flight
                && health.probe_generation == generation
            {
                health.probe_in_flight = false;
            }
            ((), None)
        });
    }

    /// Run `f` under the venue lock, then report any transition it produced.
    fn with_health<T>(
        &self,
        venue: &VenueId,
        f: impl FnOnce(&mut VenueHealth, &CircuitBreakerConfig) -> (T, Option<BreakerTransition>),
    ) -> T {
        let entry = self.table.entry(venue);
        let (value, transition) = {
            let mut health = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut health, &self.config)
        };
        if let Some(transition) = transition {
            self.announce(&transition);
        }
        value
    }

    fn announce(&self, transition: &BreakerTransition) {
        match transition.to {
            CircuitState::Open => tracing::warn!(
                venue = %transition.venue,
                from = %transition.from,
                to = "OPEN",
                "Circuit breaker opened"
            ),
            CircuitState::HalfOpen => tracing::info!(
                venue = %transition.venue,
                from = %transition.from,
                to = "HALF_OPEN",
                "Circuit breaker testing"
            ),
            CircuitState::Closed => tracing::info!(
                venue = %transition.venue,
                from = %transition.from,
                to = "CLOSED",
                "Circuit breaker closed"
            ),
        }
        record_circuit_state(transition.venue.as_str(), transition.to);
        if let Some(listener) = &self.listener {
            listener(transition);
        }
    }
}

/// Permission for one request to a venue.
///
/// Report the outcome exactly once with [`CallPermit::record`]. Dropping the
/// permit unrecorded releases a claimed HALF_OPEN probe slot without counting
/// an outcome.
#[derive(Debug)]
#[must_use = "a permit must be recorded or it only frees its probe slot"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    venue: VenueId,
    probe: Option<u64>,
    recorded: bool,
}

impl CallPermit<'_> {
    /// Venue this permit is for.
    #[must_use]
    pub const fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Whether this permit holds the HALF_OPEN probe slot.
    #[must_use]
    pub const fn is_probe(&self) -> bool {
        self.probe.is_some()
    }

    /// Report the request outcome.
    pub fn record(self, success: bool) {
        self.record_at(success, Instant::now());
    }

    /// [`Self::record`] at an explicit instant.
    pub fn record_at(mut self, success: bool, now: Instant) {
        self.recorded = true;
        self.breaker.record_outcome_at(&self.venue, success, now);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.recorded {
            return;
        }
        if let Some(generation) = self.probe {
            self.breaker.release_probe(&self.venue, generation);
        }
    }
}
