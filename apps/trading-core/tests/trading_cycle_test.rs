//! Integration tests for the decide, route and execute cycle.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use trading_core::application::ports::{MarketDataPort, TradingEvent, VenuePort};
use trading_core::application::services::{
    CycleConfig, CycleError, ExecutionScheduler, TradingCycle, VenueDispatcher, VenueRegistry,
};
use trading_core::domain::consensus::{ConsensusConfig, ConsensusEngine};
use trading_core::domain::execution_tactics::{AlgorithmKind, ExecutionStatus, OrderSide};
use trading_core::domain::obfuscation::ObfuscationConfig;
use trading_core::domain::routing::{PlatformRouter, RoutingError};
use trading_core::domain::shared::Symbol;
use trading_core::domain::signals::{
    MomentumParams, SignalAgent, SignalAgentKind, TradeAction, TrendFollowingParams,
};
use trading_core::infrastructure::events::ChannelEventPublisher;
use trading_core::infrastructure::market_data::InMemoryMarketData;
use trading_core::infrastructure::venues::{PaperVenue, PaperVenueConfig};
use trading_core::resilience::{CircuitBreaker, CircuitBreakerConfig};

use common::{equity_table, flat_snapshot, rising_snapshot, scheduler_config};

struct CycleFixture {
    cycle: Arc<TradingCycle>,
    market_data: Arc<InMemoryMarketData>,
    venue: Arc<PaperVenue>,
    breaker: Arc<CircuitBreaker>,
    events: mpsc::Receiver<TradingEvent>,
}

fn agents() -> Vec<SignalAgent> {
    vec![
        SignalAgent::from_kind(
            "momentum",
            SignalAgentKind::Momentum(MomentumParams::default()),
        ),
        SignalAgent::from_kind(
            "trend_following",
            SignalAgentKind::TrendFollowing(TrendFollowingParams::default()),
        ),
    ]
}

fn fixture(config: CycleConfig) -> CycleFixture {
    fixture_with_shutdown(config, CancellationToken::new())
}

fn fixture_with_shutdown(config: CycleConfig, shutdown: CancellationToken) -> CycleFixture {
    let venue = Arc::new(PaperVenue::seeded("alpaca", PaperVenueConfig::default(), 11));
    let breaker = Arc::new(CircuitBreaker::with_venues(
        CircuitBreakerConfig::default(),
        [venue.venue_id().clone()],
    ));
    let mut registry = VenueRegistry::new();
    registry.register(
        Arc::clone(&venue) as Arc<dyn VenuePort>,
        Duration::from_secs(5),
    );

    let (publisher, events) = ChannelEventPublisher::new(256);
    let publisher = Arc::new(publisher);
    let router = PlatformRouter::new(equity_table("alpaca", &[]), Arc::clone(&breaker));
    let scheduler = ExecutionScheduler::new(
        router.clone(),
        VenueDispatcher::new(registry, Arc::clone(&breaker)),
        ObfuscationConfig::disabled(),
        publisher.clone(),
        scheduler_config(),
    );

    let market_data = Arc::new(InMemoryMarketData::new());
    let cycle = TradingCycle::new(
        Arc::clone(&market_data) as Arc<dyn MarketDataPort>,
        agents(),
        ConsensusEngine::new(ConsensusConfig::default()),
        router,
        scheduler,
        publisher,
        config,
    )
    .with_shutdown(shutdown);

    CycleFixture {
        cycle: Arc::new(cycle),
        market_data,
        venue,
        breaker,
        events,
    }
}

fn market_config(size: Decimal) -> CycleConfig {
    CycleConfig {
        default_order_size: size,
        algorithm: Some(AlgorithmKind::Market),
        ..CycleConfig::default()
    }
}

fn drain(events: &mut mpsc::Receiver<TradingEvent>) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind());
    }
    kinds
}

#[tokio::test(start_paused = true)]
async fn test_flat_market_holds_without_orders() {
    let mut f = fixture(market_config(dec!(10)));
    f.market_data.set_snapshot(flat_snapshot("AAPL"));

    let report = f.cycle.run_cycle(Symbol::new("AAPL")).await.unwrap();

    assert!(report.is_hold());
    assert_eq!(report.decision.action, TradeAction::Hold);
    assert!(report.routing.is_none());
    assert!(report.outcome.is_none());
    assert_eq!(f.venue.order_count(), 0);
    assert_eq!(drain(&mut f.events), vec!["decision"]);
}

#[tokio::test(start_paused = true)]
async fn test_rising_market_buys_and_fills() {
    let mut f = fixture(market_config(dec!(10)));
    f.market_data.set_snapshot(rising_snapshot("AAPL"));

    let report = f.cycle.run_cycle(Symbol::new("AAPL")).await.unwrap();

    assert_eq!(report.decision.action, TradeAction::Buy);
    assert!(report.decision.confidence >= 0.6);
    assert_eq!(report.algorithm, Some(AlgorithmKind::Market));
    assert_eq!(report.routing.as_ref().unwrap().primary().unwrap().as_str(), "alpaca");

    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.side, OrderSide::Buy);
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.filled, dec!(10));
    assert_eq!(f.venue.order_count(), 1);

    assert_eq!(
        drain(&mut f.events),
        vec!["decision", "routing", "plan_created", "child_order", "plan_finished"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_all_keeps_symbol_order() {
    let f = fixture(market_config(dec!(5)));
    f.market_data.set_snapshot(rising_snapshot("AAPL"));
    f.market_data.set_snapshot(flat_snapshot("MSFT"));
    let symbols = [Symbol::new("MSFT"), Symbol::new("AAPL"), Symbol::new("TSLA")];

    let results = f.cycle.run_all(&symbols).await;

    let order: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(order, vec!["MSFT", "AAPL", "TSLA"]);
    assert!(results[0].1.as_ref().unwrap().is_hold());
    assert_eq!(
        results[1].1.as_ref().unwrap().outcome.as_ref().unwrap().status,
        ExecutionStatus::Completed
    );
    assert!(matches!(results[2].1, Err(CycleError::MarketData(_))));
}

#[tokio::test(start_paused = true)]
async fn test_open_circuits_surface_no_available_venue() {
    let f = fixture(market_config(dec!(10)));
    f.market_data.set_snapshot(rising_snapshot("AAPL"));
    let alpaca = f.venue.venue_id().clone();
    for _ in 0..5 {
        f.breaker.record_outcome(&alpaca, false);
    }

    let result = f.cycle.run_cycle(Symbol::new("AAPL")).await;

    let Err(CycleError::Routing(RoutingError::NoAvailableVenue { symbol, .. })) = result else {
        panic!("expected NoAvailableVenue");
    };
    assert_eq!(symbol.as_str(), "AAPL");
    assert_eq!(f.venue.order_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_small_order_selects_market_automatically() {
    let f = fixture(CycleConfig {
        default_order_size: dec!(1),
        ..CycleConfig::default()
    });
    f.market_data.set_snapshot(rising_snapshot("AAPL"));

    let report = f.cycle.run_cycle(Symbol::new("AAPL")).await.unwrap();

    assert_eq!(report.algorithm, Some(AlgorithmKind::Market));
    assert_eq!(report.outcome.unwrap().status, ExecutionStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_running_plan() {
    let shutdown = CancellationToken::new();
    let f = fixture_with_shutdown(
        CycleConfig {
            default_order_size: dec!(100),
            algorithm: Some(AlgorithmKind::Twap),
            ..CycleConfig::default()
        },
        shutdown.clone(),
    );
    f.market_data.set_snapshot(rising_snapshot("AAPL"));

    let cycle = Arc::clone(&f.cycle);
    let running = tokio::spawn(async move { cycle.run_cycle(Symbol::new("AAPL")).await });
    tokio::time::sleep(Duration::from_secs(90)).await;
    shutdown.cancel();

    let report = running.await.unwrap().unwrap();
    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
    assert_eq!(outcome.filled, dec!(20));
    assert_eq!(f.venue.order_count(), 2);
}
