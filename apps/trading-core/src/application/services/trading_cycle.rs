//! Trading Cycle
//!
//! One pass for one symbol: snapshot → agents → consensus → route → tactic
//! → plan → run → outcome. Symbols run concurrently; a symbol's own steps
//! run in order.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::execution_scheduler::ExecutionScheduler;
use crate::application::ports::{EventPublisherPort, MarketDataError, MarketDataPort, TradingEvent};
use crate::domain::consensus::{ConsensusDecision, ConsensusEngine};
use crate::domain::execution_tactics::TacticError;
use crate::domain::execution_tactics::services::{TacticSelector, build_plan};
use crate::domain::execution_tactics::value_objects::{
    AlgorithmKind, ExecutionOutcome, ExecutionParams, ParentOrder, TacticSelectionContext,
    TacticUrgency,
};
use crate::domain::routing::{PlatformRouter, RoutingError, RoutingPlan};
use crate::domain::shared::{CycleId, DomainError, PlanId, Symbol, VenueId};
use crate::domain::signals::{AgentOpinion, MarketSnapshot, SignalAgent, SignalSource};
use crate::observability::record_decision;

/// Cycle errors.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Snapshot could not be fetched.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// No venue could take the order.
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// The execution plan could not be built.
    #[error("Plan error: {0}")]
    Tactic(#[from] TacticError),

    /// The parent order was invalid.
    #[error("Order error: {0}")]
    Order(#[from] DomainError),

    /// The cycle task panicked or was aborted.
    #[error("Cycle task failed: {0}")]
    Task(String),
}

/// Per-cycle trading settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Parent order size per symbol.
    pub order_sizes: HashMap<Symbol, Decimal>,
    /// Parent order size for symbols without an entry.
    pub default_order_size: Decimal,
    /// Fixed algorithm, or automatic selection when unset.
    pub algorithm: Option<AlgorithmKind>,
    /// Algorithm parameters.
    pub params: ExecutionParams,
    /// Decision confidence at or above which urgency is high.
    pub urgency_cutoff: f64,
    /// Bars averaged for the size-vs-volume ratio.
    pub volume_window: usize,
    /// Venues to try ahead of the routing table.
    pub venue_preference: Vec<VenueId>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            order_sizes: HashMap::new(),
            default_order_size: Decimal::ONE,
            algorithm: None,
            params: ExecutionParams::default(),
            urgency_cutoff: 0.85,
            volume_window: 20,
            venue_preference: Vec::new(),
        }
    }
}

impl CycleConfig {
    /// Parent order size for a symbol.
    #[must_use]
    pub fn order_size(&self, symbol: &Symbol) -> Decimal {
        self.order_sizes
            .get(symbol)
            .copied()
            .unwrap_or(self.default_order_size)
    }
}

/// What one cycle did for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cycle identifier.
    pub cycle_id: CycleId,
    /// Instrument.
    pub symbol: Symbol,
    /// Consensus decision.
    pub decision: ConsensusDecision,
    /// Routing plan, for actionable decisions.
    pub routing: Option<RoutingPlan>,
    /// Algorithm chosen.
    pub algorithm: Option<AlgorithmKind>,
    /// Execution plan run.
    pub plan_id: Option<PlanId>,
    /// Execution result.
    pub outcome: Option<ExecutionOutcome>,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    /// Whether the cycle ended at a HOLD decision.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        !self.decision.is_actionable()
    }
}

/// Drives trading cycles.
pub struct TradingCycle {
    market_data: Arc<dyn MarketDataPort>,
    agents: Vec<SignalAgent>,
    consensus: ConsensusEngine,
    router: PlatformRouter,
    selector: TacticSelector,
    scheduler: ExecutionScheduler,
    publisher: Arc<dyn EventPublisherPort>,
    config: CycleConfig,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for TradingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingCycle")
            .field("agents", &self.agents.len())
            .field("consensus", &self.consensus)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TradingCycle {
    /// Create a trading cycle.
    #[must_use]
    pub fn new(
        market_data: Arc<dyn MarketDataPort>,
        agents: Vec<SignalAgent>,
        consensus: ConsensusEngine,
        router: PlatformRouter,
        scheduler: ExecutionScheduler,
        publisher: Arc<dyn EventPublisherPort>,
        config: CycleConfig,
    ) -> Self {
        Self {
            market_data,
            agents,
            consensus,
            router,
            selector: TacticSelector::default(),
            scheduler,
            publisher,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel in-flight plans when `token` is cancelled.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Replace the tactic selector.
    #[must_use]
    pub fn with_selector(mut self, selector: TacticSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Run one cycle for one symbol.
    ///
    /// # Errors
    ///
    /// Market data, routing, plan building or order validation failures.
    /// HOLD is not an error.
    pub async fn run_cycle(&self, symbol: Symbol) -> Result<CycleReport, CycleError> {
        let cycle_id = CycleId::generate();
        let started_at = Utc::now();

        let snapshot = self.market_data.snapshot(&symbol).await?;
        let opinions: Vec<AgentOpinion> = self.agents.iter().map(|a| a.analyze(&snapshot)).collect();
        let decision = self.consensus.decide(symbol.clone(), opinions);

        record_decision(symbol.as_str(), decision.action, decision.confidence);
        tracing::info!(
            cycle_id = %cycle_id,
            symbol = %symbol,
            action = %decision.action,
            confidence = decision.confidence,
            buy = decision.scores.buy,
            sell = decision.scores.sell,
            hold = decision.scores.hold,
            "Consensus decision"
        );
        self.publisher.publish(TradingEvent::Decision(decision.clone()));

        let mut report = CycleReport {
            cycle_id,
            symbol: symbol.clone(),
            decision,
            routing: None,
            algorithm: None,
            plan_id: None,
            outcome: None,
            started_at,
            finished_at: started_at,
        };
        let Some(side) = report.decision.action.side() else {
            report.finished_at = Utc::now();
            return Ok(report);
        };

        let routing = self
            .router
            .route(&report.decision, &self.config.venue_preference)?;
        self.publisher.publish(TradingEvent::Routing(routing.clone()));

        let size = self.config.order_size(&symbol);
        let order = ParentOrder::new(symbol, side, size, snapshot.last_price)?;
        let algorithm = self.select_algorithm(&report.decision, &snapshot, size);
        let plan = build_plan(order, algorithm, &self.config.params)?;
        self.publisher.publish(TradingEvent::PlanCreated(plan.clone()));

        report.routing = Some(routing);
        report.algorithm = Some(algorithm);
        report.plan_id = Some(plan.id().clone());

        let handle = self
            .scheduler
            .run_with_token(plan, self.shutdown.child_token());
        report.outcome = Some(handle.outcome().await);
        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Run one cycle per symbol concurrently; results in symbol order.
    pub async fn run_all(
        self: &Arc<Self>,
        symbols: &[Symbol],
    ) -> Vec<(Symbol, Result<CycleReport, CycleError>)> {
        let mut tasks = JoinSet::new();
        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let cycle = Arc::clone(self);
            tasks.spawn(async move {
                let result = cycle.run_cycle(symbol.clone()).await;
                (index, symbol, result)
            });
        }

        let mut results: Vec<Option<(Symbol, Result<CycleReport, CycleError>)>> =
            symbols.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, symbol, result)) => {
                    if let Err(e) = &result {
                        tracing::warn!(symbol = %symbol, error = %e, "Trading cycle failed");
                    }
                    results[index] = Some((symbol, result));
                }
                Err(e) => tracing::error!(error = %e, "Trading cycle task failed"),
            }
        }

        results
            .into_iter()
            .zip(symbols)
            .map(|(slot, symbol)| {
                slot.unwrap_or_else(|| {
                    (
                        symbol.clone(),
                        Err(CycleError::Task(format!("cycle for {symbol} did not complete"))),
                    )
                })
            })
            .collect()
    }

    fn select_algorithm(
        &self,
        decision: &ConsensusDecision,
        snapshot: &MarketSnapshot,
        size: Decimal,
    ) -> AlgorithmKind {
        if let Some(algorithm) = self.config.algorithm {
            return algorithm;
        }

        let average_volume = snapshot
            .average_volume(self.config.volume_window)
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::ZERO);
        let context = TacticSelectionContext::from_volume(
            size,
            average_volume,
            TacticUrgency::from_confidence(decision.confidence, self.config.urgency_cutoff),
            self.config.params.sniper.target_price.is_some(),
        );
        let algorithm = self.selector.select(&context);
        tracing::debug!(
            symbol = %decision.symbol,
            size_pct_volume = %context.size_pct_volume,
            urgency = ?context.urgency,
            algorithm = %algorithm,
            "Execution algorithm selected"
        );
        algorithm
    }
}
