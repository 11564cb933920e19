//! Execution Scheduler
//!
//! Runs an [`ExecutionPlan`] as one background task: waits for each slice's
//! offset, re-routes, cuts and obfuscates the child order, dispatches it and
//! follows resting orders until they fill or time out. Results stream out as
//! [`SliceReport`]s while the plan runs and are summarised in an
//! [`ExecutionOutcome`] at the end.
//!
//! Every wait is raced against the plan's [`CancellationToken`]. A placement
//! already in flight is allowed to finish; a cancelled plan then cancels its
//! working child order at the venue and reports the unfilled remainder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use super::venue_dispatcher::{DispatchError, DispatchedOrder, VenueDispatcher};
use crate::application::ports::{EventPublisherPort, TradingEvent, VenueAck};
use crate::domain::execution_tactics::services::{IcebergExecutor, round_to_lot};
use crate::domain::execution_tactics::value_objects::{
    AlgorithmKind, ChildOrder, ExecutionOutcome, ExecutionPlan, ExecutionStatus, OrderKind,
    OrderSide, PartialExecutionFailure, SliceReport, SliceStatus,
};
use crate::domain::obfuscation::{ObfuscationConfig, Obfuscator};
use crate::domain::routing::PlatformRouter;
use crate::domain::shared::{PlanId, Symbol, VenueId};
use crate::observability::{record_child_order, record_plan_outcome};
use crate::resilience::{ExponentialBackoffCalculator, RetryPolicy};

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between status polls of a resting order.
    pub fill_poll_interval: Duration,
    /// Fill wait for accepted market orders that did not fill on placement.
    pub fill_timeout: Duration,
    /// Retry policy for slices whose dispatch failed.
    pub retry: RetryPolicy,
    /// Venues to try ahead of the routing table.
    pub venue_preference: Vec<VenueId>,
    /// Seed for reproducible obfuscation; OS entropy when unset.
    pub obfuscation_seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fill_poll_interval: Duration::from_secs(1),
            fill_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            venue_preference: Vec::new(),
            obfuscation_seed: None,
        }
    }
}

struct SchedulerContext {
    router: PlatformRouter,
    dispatcher: VenueDispatcher,
    obfuscation: ObfuscationConfig,
    publisher: Arc<dyn EventPublisherPort>,
    config: SchedulerConfig,
}

/// Spawns one task per execution plan.
#[derive(Clone)]
pub struct ExecutionScheduler {
    context: Arc<SchedulerContext>,
    runs: Arc<AtomicU64>,
}

impl std::fmt::Debug for ExecutionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionScheduler")
            .field("config", &self.context.config)
            .field("obfuscation", &self.context.obfuscation)
            .finish_non_exhaustive()
    }
}

impl ExecutionScheduler {
    /// Create a scheduler.
    #[must_use]
    pub fn new(
        router: PlatformRouter,
        dispatcher: VenueDispatcher,
        obfuscation: ObfuscationConfig,
        publisher: Arc<dyn EventPublisherPort>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            context: Arc::new(SchedulerContext {
                router,
                dispatcher,
                obfuscation,
                publisher,
                config,
            }),
            runs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.context.config
    }

    /// Start running a plan. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn run(&self, plan: ExecutionPlan) -> ExecutionHandle {
        self.run_with_token(plan, CancellationToken::new())
    }

    /// Start running a plan under an existing cancellation token, typically
    /// a child of a process-wide shutdown token.
    #[must_use]
    pub fn run_with_token(&self, plan: ExecutionPlan, token: CancellationToken) -> ExecutionHandle {
        let run_number = self.runs.fetch_add(1, Ordering::Relaxed);
        let obfuscation = self.context.obfuscation.clone();
        let obfuscator = match self.context.config.obfuscation_seed {
            Some(seed) => Obfuscator::seeded(obfuscation, seed.wrapping_add(run_number)),
            None => Obfuscator::new(obfuscation),
        };

        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        let summary = PlanSummary::from_plan(&plan);
        let run = PlanRun {
            context: Arc::clone(&self.context),
            plan,
            obfuscator,
            token: token.clone(),
            reports: reports_tx,
            slices: Vec::new(),
            filled: Decimal::ZERO,
            start: Instant::now(),
            started_at: Utc::now(),
        };

        ExecutionHandle {
            summary,
            token,
            reports: Some(reports_rx),
            task: tokio::spawn(run.execute()),
        }
    }
}

/// Handle to a running plan.
#[derive(Debug)]
pub struct ExecutionHandle {
    summary: PlanSummary,
    token: CancellationToken,
    reports: Option<mpsc::UnboundedReceiver<SliceReport>>,
    task: JoinHandle<ExecutionOutcome>,
}

impl ExecutionHandle {
    /// Plan being run.
    #[must_use]
    pub const fn plan_id(&self) -> &PlanId {
        &self.summary.plan_id
    }

    /// Slice reports in dispatch order. The stream ends when the plan does.
    ///
    /// Reports are buffered from the start, so nothing is missed by taking
    /// the stream late. Only the first call yields reports.
    pub fn stream(&mut self) -> UnboundedReceiverStream<SliceReport> {
        let receiver = self.reports.take().unwrap_or_else(|| {
            let (_, receiver) = mpsc::unbounded_channel();
            receiver
        });
        UnboundedReceiverStream::new(receiver)
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token observed by the plan.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the plan task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the final outcome.
    pub async fn outcome(self) -> ExecutionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    plan_id = %self.summary.plan_id,
                    error = %e,
                    "Execution task ended abnormally"
                );
                self.summary.aborted(format!("execution task ended abnormally: {e}"))
            }
        }
    }
}

/// Plan facts kept by the handle.
#[derive(Debug, Clone)]
struct PlanSummary {
    plan_id: PlanId,
    symbol: Symbol,
    side: OrderSide,
    algorithm: AlgorithmKind,
    requested: Decimal,
    started_at: DateTime<Utc>,
}

impl PlanSummary {
    fn from_plan(plan: &ExecutionPlan) -> Self {
        Self {
            plan_id: plan.id().clone(),
            symbol: plan.order().symbol.clone(),
            side: plan.order().side,
            algorithm: plan.algorithm(),
            requested: plan.order().total_size,
            started_at: Utc::now(),
        }
    }

    fn aborted(self, cause: String) -> ExecutionOutcome {
        ExecutionOutcome {
            failure: Some(PartialExecutionFailure {
                plan_id: self.plan_id.clone(),
                symbol: self.symbol.clone(),
                filled: Decimal::ZERO,
                remaining: self.requested,
                cause,
            }),
            plan_id: self.plan_id,
            symbol: self.symbol,
            side: self.side,
            algorithm: self.algorithm,
            status: ExecutionStatus::PartiallyFailed,
            requested: self.requested,
            filled: Decimal::ZERO,
            remaining: self.requested,
            slices: Vec::new(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Why a plan stopped early.
enum Stop {
    Cancelled,
    Failed(String),
}

/// How one slice ended.
enum SliceResult {
    Done(Decimal),
    Cancelled,
    Failed(String),
}

/// One child order to cut.
struct SliceRequest {
    index: usize,
    planned_size: Decimal,
    kind: OrderKind,
    limit_price: Option<Decimal>,
    resting_timeout: Option<Duration>,
    exact_remainder: bool,
}

/// State of one running plan, owned by its task.
struct PlanRun {
    context: Arc<SchedulerContext>,
    plan: ExecutionPlan,
    obfuscator: Obfuscator,
    token: CancellationToken,
    reports: mpsc::UnboundedSender<SliceReport>,
    slices: Vec<SliceReport>,
    filled: Decimal,
    start: Instant,
    started_at: DateTime<Utc>,
}

impl PlanRun {
    async fn execute(mut self) -> ExecutionOutcome {
        if let Err(e) = self.plan.transition_to(ExecutionStatus::Running) {
            tracing::warn!(plan_id = %self.plan.id(), error = %e, "Plan cannot start");
            return self.finish(Some(Stop::Failed(e.to_string())));
        }

        tracing::info!(
            plan_id = %self.plan.id(),
            symbol = %self.plan.order().symbol,
            side = %self.plan.order().side,
            algorithm = %self.plan.algorithm(),
            size = %self.plan.order().total_size,
            slices = self.plan.slices().len(),
            "Execution plan started"
        );

        let stop = if self.plan.algorithm() == AlgorithmKind::Iceberg {
            self.run_iceberg().await
        } else {
            self.run_slices().await
        };
        self.finish(stop)
    }

    fn remaining(&self) -> Decimal {
        (self.plan.order().total_size - self.filled).max(Decimal::ZERO)
    }

    async fn run_slices(&mut self) -> Option<Stop> {
        let slices = self.plan.slices().to_vec();
        let last = slices.len().saturating_sub(1);

        for slice in slices {
            if self.remaining() <= Decimal::ZERO {
                return None;
            }
            if !self.sleep_until(self.start + slice.offset).await {
                return Some(Stop::Cancelled);
            }

            let request = SliceRequest {
                index: slice.index,
                planned_size: slice.size,
                kind: slice.kind,
                limit_price: slice.limit_price,
                resting_timeout: slice.resting_timeout,
                exact_remainder: slice.index == last,
            };
            match self.execute_slice(request).await {
                SliceResult::Done(_) => {}
                SliceResult::Cancelled => return Some(Stop::Cancelled),
                SliceResult::Failed(cause) => return Some(Stop::Failed(cause)),
            }
        }
        None
    }

    async fn run_iceberg(&mut self) -> Option<Stop> {
        let config = self.plan.iceberg().cloned().unwrap_or_default();
        let mut executor = IcebergExecutor::new(
            self.plan.order().total_size,
            config.clone(),
            self.plan.lot_size(),
        );
        let price = self.plan.order().resting_price();
        let mut next = Some(executor.first_peak());

        while let Some(peak) = next {
            if peak.peak_number > 0 && !self.sleep_for(config.min_interval()).await {
                return Some(Stop::Cancelled);
            }

            let request = SliceRequest {
                index: peak.peak_number,
                planned_size: peak.quantity,
                kind: OrderKind::Limit,
                limit_price: Some(price),
                resting_timeout: Some(config.peak_timeout()),
                exact_remainder: peak.quantity >= self.remaining(),
            };
            let filled = match self.execute_slice(request).await {
                SliceResult::Done(filled) => filled,
                SliceResult::Cancelled => return Some(Stop::Cancelled),
                SliceResult::Failed(cause) => return Some(Stop::Failed(cause)),
            };
            next = executor.on_fill(filled);
        }

        if executor.is_stalled() && !executor.is_complete() {
            return Some(Stop::Failed(format!(
                "{} consecutive iceberg peaks filled nothing",
                config.max_idle_peaks
            )));
        }
        None
    }

    /// Route, cut, obfuscate and dispatch one slice, retrying a failed
    /// dispatch per the retry policy, then follow the order to its end.
    async fn execute_slice(&mut self, request: SliceRequest) -> SliceResult {
        let mut backoff = ExponentialBackoffCalculator::new(&self.context.config.retry);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let route = self.context.router.route_symbol(
                &self.plan.order().symbol,
                self.plan.order().side,
                &self.context.config.venue_preference,
            );
            let child = self.cut_child(&request);
            if !self.sleep_for(child.submit_delay).await {
                return SliceResult::Cancelled;
            }

            // Never dropped mid-flight: an accepted order must reach settle()
            // so a cancelled plan cancels it at the venue and counts its fill.
            let dispatched = match route {
                Ok(route) => match self
                    .context
                    .dispatcher
                    .dispatch_until(child.clone(), &route, &self.token)
                    .await
                {
                    Ok(dispatched) => Ok(dispatched),
                    Err(DispatchError::Cancelled { .. }) => return SliceResult::Cancelled,
                    Err(e) => Err(e.to_string()),
                },
                Err(e) => Err(e.to_string()),
            };

            match dispatched {
                Ok(dispatched) => return self.settle(&request, dispatched, attempts).await,
                Err(cause) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            plan_id = %self.plan.id(),
                            slice = request.index,
                            error = %cause,
                            retry_in_ms = delay.as_millis() as u64,
                            "Slice dispatch failed, retrying"
                        );
                        if !self.sleep_for(delay).await {
                            return SliceResult::Cancelled;
                        }
                        continue;
                    }

                    tracing::warn!(
                        plan_id = %self.plan.id(),
                        slice = request.index,
                        attempts,
                        error = %cause,
                        "Slice dispatch failed, giving up"
                    );
                    let report = self.report(
                        &child,
                        None,
                        SliceStatus::Failed,
                        None,
                        attempts,
                        Some(cause.clone()),
                    );
                    self.emit(report);
                    return SliceResult::Failed(cause);
                }
            }
        }
    }

    /// Child order for a slice: planned size, obfuscated, then clamped to the
    /// unfilled remainder. The final slice takes the exact remainder.
    fn cut_child(&mut self, request: &SliceRequest) -> ChildOrder {
        let remaining = self.remaining();
        let order = self.plan.order();
        let planned = ChildOrder::new(
            self.plan.id().clone(),
            request.index,
            order.symbol.clone(),
            order.side,
            request.planned_size.min(remaining),
            request.kind,
            request.limit_price,
        );

        let mut child = self.obfuscator.perturb(planned);
        child.size = if request.exact_remainder {
            remaining
        } else {
            let fuzzed = round_to_lot(child.size, self.plan.lot_size()).min(remaining);
            if fuzzed > Decimal::ZERO {
                fuzzed
            } else {
                request.planned_size.min(remaining)
            }
        };
        child
    }

    /// Follow an accepted order until it stops working, then account for it.
    async fn settle(
        &mut self,
        request: &SliceRequest,
        dispatched: DispatchedOrder,
        attempts: u32,
    ) -> SliceResult {
        let DispatchedOrder { child, ack, .. } = dispatched;
        let venue = child.venue.clone();

        let (ack, cancelled) = match (&venue, ack.status.is_working()) {
            (Some(venue), true) if self.token.is_cancelled() => {
                (self.cancel_resting(venue, ack).await, true)
            }
            (Some(venue), true) => {
                let timeout = request
                    .resting_timeout
                    .unwrap_or(self.context.config.fill_timeout);
                self.await_fill(venue, ack, timeout).await
            }
            _ => (ack, false),
        };

        let filled = ack.filled_size.clamp(Decimal::ZERO, child.size);
        let status = if cancelled {
            SliceStatus::Cancelled
        } else if filled >= child.size {
            SliceStatus::Filled
        } else if filled > Decimal::ZERO {
            SliceStatus::PartiallyFilled
        } else {
            SliceStatus::Unfilled
        };

        self.filled += filled;
        let report = self.report(&child, Some(&ack), status, venue, attempts, None);
        self.emit(report);

        if cancelled {
            SliceResult::Cancelled
        } else {
            SliceResult::Done(filled)
        }
    }

    /// Poll a resting order until it stops working, times out or the plan is
    /// cancelled. Returns the last known state and whether cancellation ended
    /// the wait.
    async fn await_fill(&self, venue: &VenueId, ack: VenueAck, timeout: Duration) -> (VenueAck, bool) {
        let deadline = Instant::now() + timeout;
        let mut latest = ack;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = self.context.config.fill_poll_interval.min(deadline - now);
            tokio::select! {
                biased;
                () = self.token.cancelled() => {
                    return (self.cancel_resting(venue, latest).await, true);
                }
                () = tokio::time::sleep(wait) => {}
            }

            match self
                .context
                .dispatcher
                .poll_status(venue, &latest.venue_order_id)
                .await
            {
                Ok(status) => {
                    latest = status;
                    if !latest.status.is_working() {
                        return (latest, false);
                    }
                }
                Err(e) => tracing::warn!(
                    plan_id = %self.plan.id(),
                    venue = %venue,
                    error = %e,
                    "Status poll failed"
                ),
            }
        }

        tracing::debug!(
            plan_id = %self.plan.id(),
            venue = %venue,
            venue_order_id = %latest.venue_order_id,
            filled = %latest.filled_size,
            "Resting order timed out, cancelling remainder"
        );
        (self.cancel_resting(venue, latest).await, false)
    }

    /// Cancel a resting order and read its final fill.
    async fn cancel_resting(&self, venue: &VenueId, latest: VenueAck) -> VenueAck {
        let dispatcher = &self.context.dispatcher;
        let _ = dispatcher.cancel(venue, &latest.venue_order_id).await;
        match dispatcher.poll_status(venue, &latest.venue_order_id).await {
            Ok(status) if status.filled_size >= latest.filled_size => status,
            _ => latest,
        }
    }

    fn report(
        &self,
        child: &ChildOrder,
        ack: Option<&VenueAck>,
        status: SliceStatus,
        venue: Option<VenueId>,
        attempts: u32,
        error: Option<String>,
    ) -> SliceReport {
        let filled_size = ack.map_or(Decimal::ZERO, |a| a.filled_size.clamp(Decimal::ZERO, child.size));
        SliceReport {
            plan_id: self.plan.id().clone(),
            slice_index: child.slice_index,
            child_id: child.id.clone(),
            venue,
            requested_size: child.size,
            filled_size,
            avg_fill_price: ack.and_then(|a| a.avg_fill_price).filter(|_| filled_size > Decimal::ZERO),
            status,
            attempts,
            cumulative_filled: self.filled,
            remaining: self.remaining(),
            error,
            reported_at: Utc::now(),
        }
    }

    fn emit(&mut self, report: SliceReport) {
        tracing::debug!(
            plan_id = %report.plan_id,
            slice = report.slice_index,
            venue = report.venue.as_ref().map_or("-", |v| v.as_str()),
            requested = %report.requested_size,
            filled = %report.filled_size,
            status = ?report.status,
            "Slice finished"
        );
        record_child_order(
            report.venue.as_ref().map_or("none", |v| v.as_str()),
            report.status,
        );
        self.context
            .publisher
            .publish(TradingEvent::ChildOrder(report.clone()));
        // Receiver may be gone; the report is still kept in the outcome.
        let _ = self.reports.send(report.clone());
        self.slices.push(report);
    }

    async fn sleep_until(&self, deadline: Instant) -> bool {
        tokio::select! {
            biased;
            () = self.token.cancelled() => false,
            () = tokio::time::sleep_until(deadline) => true,
        }
    }

    async fn sleep_for(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration).await
    }

    fn finish(mut self, stop: Option<Stop>) -> ExecutionOutcome {
        let remaining = self.remaining();
        let (status, cause) = match stop {
            Some(Stop::Cancelled) => (ExecutionStatus::Cancelled, None),
            Some(Stop::Failed(cause)) => (ExecutionStatus::PartiallyFailed, Some(cause)),
            None if remaining <= Decimal::ZERO => (ExecutionStatus::Completed, None),
            None => (
                ExecutionStatus::PartiallyFailed,
                Some(format!("{remaining} left unfilled after the final slice")),
            ),
        };
        if let Err(e) = self.plan.transition_to(status) {
            tracing::debug!(plan_id = %self.plan.id(), error = %e, "Plan status not updated");
        }

        let order = self.plan.order();
        let failure = cause.map(|cause| PartialExecutionFailure {
            plan_id: self.plan.id().clone(),
            symbol: order.symbol.clone(),
            filled: self.filled,
            remaining,
            cause,
        });

        let outcome = ExecutionOutcome {
            plan_id: self.plan.id().clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            algorithm: self.plan.algorithm(),
            status,
            requested: order.total_size,
            filled: self.filled,
            remaining,
            slices: std::mem::take(&mut self.slices),
            failure,
            started_at: self.started_at,
            finished_at: Utc::now(),
        };

        match &outcome.failure {
            Some(failure) => tracing::warn!(
                plan_id = %outcome.plan_id,
                symbol = %outcome.symbol,
                filled = %failure.filled,
                remaining = %failure.remaining,
                cause = %failure.cause,
                "Execution plan partially failed"
            ),
            None => tracing::info!(
                plan_id = %outcome.plan_id,
                symbol = %outcome.symbol,
                status = %outcome.status,
                filled = %outcome.filled,
                remaining = %outcome.remaining,
                "Execution plan finished"
            ),
        }
        record_plan_outcome(outcome.algorithm, outcome.status);
        self.context
            .publisher
            .publish(TradingEvent::PlanFinished(outcome.clone()));
        outcome
    }
}
