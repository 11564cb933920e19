//! Paper trading venue.
//!
//! Simulates a venue in memory: market orders fill at the mark price, limit
//! orders fill when marketable and otherwise rest, filling a fraction of
//! their remainder on each status poll. Latency, transport failures and
//! rejections can be injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::application::ports::{VenueAck, VenueError, VenueOrderRequest, VenueOrderStatus, VenuePort};
use crate::domain::execution_tactics::services::SIZE_DP;
use crate::domain::execution_tactics::value_objects::{OrderKind, OrderSide};
use crate::domain::shared::{Symbol, VenueId, VenueOrderId};

/// Paper venue behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperVenueConfig {
    /// Simulated round-trip latency per call (milliseconds).
    pub latency_ms: u64,
    /// Probability that `place_order` fails with a connection error.
    pub failure_rate: f64,
    /// Probability that `place_order` is rejected.
    pub reject_rate: f64,
    /// Fraction of a resting order's remainder filled per status poll.
    pub resting_fill_ratio: f64,
    /// Mark price for symbols without one.
    pub default_price: Decimal,
}

impl Default for PaperVenueConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
            reject_rate: 0.0,
            resting_fill_ratio: 0.5,
            default_price: Decimal::from(100),
        }
    }
}

#[derive(Debug, Clone)]
struct PaperOrder {
    request: VenueOrderRequest,
    status: VenueOrderStatus,
    filled: Decimal,
    avg_price: Option<Decimal>,
}

impl PaperOrder {
    fn ack(&self, id: &VenueOrderId) -> VenueAck {
        VenueAck {
            venue_order_id: id.clone(),
            status: self.status,
            filled_size: self.filled,
            avg_fill_price: self.avg_price,
            reason: None,
        }
    }

    fn fill(&mut self, size: Decimal, price: Decimal) {
        let size = size.min(self.request.quantity - self.filled);
        if size <= Decimal::ZERO {
            return;
        }
        let notional = self.avg_price.unwrap_or(Decimal::ZERO) * self.filled + price * size;
        self.filled += size;
        self.avg_price = Some(notional / self.filled);
        self.status = if self.filled >= self.request.quantity {
            VenueOrderStatus::Filled
        } else {
            VenueOrderStatus::PartiallyFilled
        };
    }
}

/// In-memory venue for paper trading and tests.
#[derive(Debug)]
pub struct PaperVenue {
    id: VenueId,
    config: PaperVenueConfig,
    prices: RwLock<HashMap<Symbol, Decimal>>,
    orders: RwLock<HashMap<VenueOrderId, PaperOrder>>,
    rng: Mutex<StdRng>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl PaperVenue {
    /// Create a paper venue.
    #[must_use]
    pub fn new(id: impl Into<VenueId>, config: PaperVenueConfig) -> Self {
        Self::with_rng(id, config, StdRng::from_os_rng())
    }

    /// Create a paper venue with reproducible failure injection.
    #[must_use]
    pub fn seeded(id: impl Into<VenueId>, config: PaperVenueConfig, seed: u64) -> Self {
        Self::with_rng(id, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(id: impl Into<VenueId>, config: PaperVenueConfig, rng: StdRng) -> Self {
        Self {
            id: id.into(),
            config,
            prices: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Set the mark price for a symbol.
    pub fn set_price(&self, symbol: &Symbol, price: Decimal) {
        self.prices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.clone(), price);
    }

    /// Simulate an outage: every call fails with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of orders placed.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn mark_price(&self, symbol: &Symbol) -> Decimal {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
            .unwrap_or(self.config.default_price)
    }

    fn roll(&self, probability: f64) -> bool {
        probability > 0.0
            && self
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .random_bool(probability.min(1.0))
    }

    async fn simulate_latency(&self) -> Result<(), VenueError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(VenueError::Connection {
                message: format!("{} is offline", self.id),
            });
        }
        Ok(())
    }

    fn marketable(request: &VenueOrderRequest, mark: Decimal) -> bool {
        match (request.kind, request.limit_price) {
            (OrderKind::Market, _) | (OrderKind::Limit, None) => true,
            (OrderKind::Limit, Some(limit)) => match request.side {
                OrderSide::Buy => limit >= mark,
                OrderSide::Sell => limit <= mark,
            },
        }
    }
}

#[async_trait]
impl VenuePort for PaperVenue {
    fn venue_id(&self) -> &VenueId {
        &self.id
    }

    async fn place_order(&self, request: VenueOrderRequest) -> Result<VenueAck, VenueError> {
        self.simulate_latency().await?;
        if self.roll(self.config.failure_rate) {
            return Err(VenueError::Connection {
                message: "simulated transport failure".to_string(),
            });
        }

        let id = VenueOrderId::new(format!(
            "{}-{}",
            self.id,
            self.next_id.fetch_add(1, Ordering::Relaxed)
        ));
        if request.quantity <= Decimal::ZERO {
            return Ok(VenueAck::rejected(id, "quantity must be positive"));
        }
        if self.roll(self.config.reject_rate) {
            return Ok(VenueAck::rejected(id, "simulated rejection"));
        }

        let mark = self.mark_price(&request.symbol);
        let mut order = PaperOrder {
            status: VenueOrderStatus::Accepted,
            filled: Decimal::ZERO,
            avg_price: None,
            request,
        };
        if Self::marketable(&order.request, mark) {
            let price = match order.request.kind {
                OrderKind::Market => mark,
                OrderKind::Limit => order.request.limit_price.unwrap_or(mark),
            };
            order.fill(order.request.quantity, price);
        }

        let ack = order.ack(&id);
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, order);
        Ok(ack)
    }

    async fn cancel_order(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError> {
        self.simulate_latency().await?;
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let order = orders
            .get_mut(venue_order_id)
            .ok_or_else(|| VenueError::NotFound {
                order_id: venue_order_id.to_string(),
            })?;
        if order.status.is_working() {
            order.status = VenueOrderStatus::Cancelled;
        }
        Ok(())
    }

    async fn order_status(&self, venue_order_id: &VenueOrderId) -> Result<VenueAck, VenueError> {
        self.simulate_latency().await?;
        let ratio = Decimal::from_f64(self.config.resting_fill_ratio.clamp(0.0, 1.0))
            .unwrap_or(Decimal::ZERO);

        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let order = orders
            .get_mut(venue_order_id)
            .ok_or_else(|| VenueError::NotFound {
                order_id: venue_order_id.to_string(),
            })?;

        if order.status.is_working() && ratio > Decimal::ZERO {
            let remaining = order.request.quantity - order.filled;
            let mut size = (remaining * ratio).round_dp(SIZE_DP);
            if size <= Decimal::ZERO {
                size = remaining;
            }
            let price = order.request.limit_price.unwrap_or(self.config.default_price);
            order.fill(size, price);
        }
        Ok(order.ack(venue_order_id))
    }
}
