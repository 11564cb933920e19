//! Shared fixtures for integration tests: a scripted venue and helpers to
//! wire a scheduler or a trading cycle around it.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::Instant;

use trading_core::application::ports::{
    NoOpEventPublisher, VenueAck, VenueError, VenueOrderRequest, VenueOrderStatus, VenuePort,
};
use trading_core::application::services::{
    ExecutionScheduler, SchedulerConfig, VenueDispatcher, VenueRegistry,
};
use trading_core::domain::execution_tactics::{OrderSide, ParentOrder};
use trading_core::domain::obfuscation::ObfuscationConfig;
use trading_core::domain::routing::{PlatformRouter, VenuePreferenceTable};
use trading_core::domain::shared::{Symbol, SymbolClass, VenueId, VenueOrderId};
use trading_core::domain::signals::MarketSnapshot;
use trading_core::resilience::{CircuitBreaker, CircuitBreakerConfig, RetryPolicy};

/// What a scripted venue does with the next `place_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Fill the full quantity at 100.
    Fill,
    /// Fail with a connection error.
    Fail,
    /// Return a rejected ack.
    Reject,
    /// Accept and rest without filling.
    Rest,
    /// Never answer.
    Hang,
    /// Take the order, then fill it only after the delay.
    SlowFill(Duration),
    /// Take the order, then acknowledge it as resting after the delay.
    SlowRest(Duration),
}

/// One recorded `place_order` call.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub at: Instant,
    pub request: VenueOrderRequest,
}

/// Venue double driven by a queue of steps, then a default step.
#[derive(Debug)]
pub struct ScriptedVenue {
    id: VenueId,
    default: Step,
    script: Mutex<VecDeque<Step>>,
    placed: Mutex<Vec<PlacedOrder>>,
    resting: Mutex<HashMap<VenueOrderId, VenueAck>>,
    cancels: AtomicUsize,
    next_id: AtomicU64,
}

impl ScriptedVenue {
    pub fn new(id: &str, default: Step) -> Arc<Self> {
        Self::scripted(id, &[], default)
    }

    pub fn scripted(id: &str, steps: &[Step], default: Step) -> Arc<Self> {
        Arc::new(Self {
            id: VenueId::new(id),
            default,
            script: Mutex::new(steps.iter().copied().collect()),
            placed: Mutex::new(Vec::new()),
            resting: Mutex::new(HashMap::new()),
            cancels: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn id(&self) -> VenueId {
        self.id.clone()
    }

    pub fn placed(&self) -> Vec<PlacedOrder> {
        self.placed.lock().unwrap().clone()
    }

    pub fn quantities(&self) -> Vec<Decimal> {
        self.placed().into_iter().map(|p| p.request.quantity).collect()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Orders still working at the venue.
    pub fn live_orders(&self) -> Vec<VenueOrderId> {
        self.resting
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, ack)| ack.status.is_working())
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn rest(&self, id: VenueOrderId) -> VenueAck {
        let ack = VenueAck::accepted(id.clone());
        self.resting.lock().unwrap().insert(id, ack.clone());
        ack
    }

    fn next_step(&self) -> Step {
        self.script.lock().unwrap().pop_front().unwrap_or(self.default)
    }
}

#[async_trait]
impl VenuePort for ScriptedVenue {
    fn venue_id(&self) -> &VenueId {
        &self.id
    }

    async fn place_order(&self, request: VenueOrderRequest) -> Result<VenueAck, VenueError> {
        let quantity = request.quantity;
        self.placed.lock().unwrap().push(PlacedOrder {
            at: Instant::now(),
            request,
        });
        let id = VenueOrderId::new(format!(
            "{}-{}",
            self.id,
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));

        match self.next_step() {
            Step::Fill => Ok(VenueAck::filled(id, quantity, dec!(100))),
            Step::Fail => Err(VenueError::Connection {
                message: "connection reset".to_string(),
            }),
            Step::Reject => Ok(VenueAck::rejected(id, "insufficient liquidity")),
            Step::Rest => Ok(self.rest(id)),
            Step::SlowFill(delay) => {
                tokio::time::sleep(delay).await;
                Ok(VenueAck::filled(id, quantity, dec!(100)))
            }
            Step::SlowRest(delay) => {
                let ack = self.rest(id);
                tokio::time::sleep(delay).await;
                Ok(ack)
            }
            Step::Hang => std::future::pending().await,
        }
    }

    async fn cancel_order(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        let mut resting = self.resting.lock().unwrap();
        let ack = resting
            .get_mut(venue_order_id)
            .ok_or_else(|| VenueError::NotFound {
                order_id: venue_order_id.to_string(),
            })?;
        ack.status = VenueOrderStatus::Cancelled;
        Ok(())
    }

    async fn order_status(&self, venue_order_id: &VenueOrderId) -> Result<VenueAck, VenueError> {
        self.resting
            .lock()
            .unwrap()
            .get(venue_order_id)
            .cloned()
            .ok_or_else(|| VenueError::NotFound {
                order_id: venue_order_id.to_string(),
            })
    }
}

/// Equities go to `primary`, then the fallbacks in order.
pub fn equity_table(primary: &str, fallback: &[&str]) -> VenuePreferenceTable {
    fallback
        .iter()
        .fold(VenuePreferenceTable::new().with_primary(SymbolClass::Equity, primary), |t, v| {
            t.with_fallback(*v)
        })
}

/// Scheduler settings for tests: one retry after a fixed second.
pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        fill_poll_interval: Duration::from_secs(1),
        fill_timeout: Duration::from_secs(30),
        retry: RetryPolicy::fixed(1, Duration::from_secs(1)),
        venue_preference: Vec::new(),
        obfuscation_seed: Some(7),
    }
}

/// Breaker, router and scheduler around a set of venues.
pub struct Harness {
    pub breaker: Arc<CircuitBreaker>,
    pub router: PlatformRouter,
    pub dispatcher: VenueDispatcher,
    pub scheduler: ExecutionScheduler,
}

impl Harness {
    pub fn new(venues: &[Arc<ScriptedVenue>], table: VenuePreferenceTable) -> Self {
        Self::with(
            venues,
            table,
            CircuitBreakerConfig::default(),
            ObfuscationConfig::disabled(),
            Duration::from_secs(5),
        )
    }

    pub fn with(
        venues: &[Arc<ScriptedVenue>],
        table: VenuePreferenceTable,
        breaker_config: CircuitBreakerConfig,
        obfuscation: ObfuscationConfig,
        venue_timeout: Duration,
    ) -> Self {
        let breaker = Arc::new(CircuitBreaker::with_venues(
            breaker_config,
            venues.iter().map(|v| v.id()),
        ));
        let mut registry = VenueRegistry::new();
        for venue in venues {
            registry.register(Arc::clone(venue) as Arc<dyn VenuePort>, venue_timeout);
        }
        let router = PlatformRouter::new(table, Arc::clone(&breaker));
        let dispatcher = VenueDispatcher::new(registry, Arc::clone(&breaker));
        let scheduler = ExecutionScheduler::new(
            router.clone(),
            dispatcher.clone(),
            obfuscation,
            Arc::new(NoOpEventPublisher),
            scheduler_config(),
        );
        Self {
            breaker,
            router,
            dispatcher,
            scheduler,
        }
    }
}

/// Buy or sell order referenced at 100.
pub fn parent(symbol: &str, side: OrderSide, size: Decimal) -> ParentOrder {
    ParentOrder::new(Symbol::new(symbol), side, size, dec!(100)).unwrap()
}

/// Snapshot of a steady climb from 100 to 159.
pub fn rising_snapshot(symbol: &str) -> MarketSnapshot {
    MarketSnapshot::new(
        Symbol::new(symbol),
        (0..60).map(|i| Decimal::from(100 + i)).collect(),
        vec![dec!(1_000_000); 60],
        Utc::now(),
    )
}

/// Snapshot of an unchanged price.
pub fn flat_snapshot(symbol: &str) -> MarketSnapshot {
    MarketSnapshot::new(
        Symbol::new(symbol),
        vec![dec!(100); 60],
        vec![dec!(1_000_000); 60],
        Utc::now(),
    )
}
