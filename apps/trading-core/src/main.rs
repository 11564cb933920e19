//! Trading Core Binary
//!
//! Runs the decision and execution loop against paper venues and a
//! synthetic market data feed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trading-core -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `TRADING_CORE_CONFIG`: config path when no argument is given (default: config.yaml)
//! - `RUST_LOG`: log filter (default: `observability.logging.level`)

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use trading_core::application::ports::{EventPublisherPort, MarketDataPort, TradingEvent};
use trading_core::application::services::{
    CycleError, CycleReport, ExecutionScheduler, TradingCycle, VenueDispatcher, VenueRegistry,
};
use trading_core::config::{Config, load_config};
use trading_core::domain::consensus::ConsensusEngine;
use trading_core::domain::routing::PlatformRouter;
use trading_core::domain::shared::{Symbol, VenueId};
use trading_core::infrastructure::events::LoggingEventPublisher;
use trading_core::infrastructure::market_data::SyntheticMarketData;
use trading_core::infrastructure::venues::PaperVenue;
use trading_core::observability::{init_logging, init_metrics};
use trading_core::resilience::{BreakerTransition, CircuitBreaker, TransitionListener};

/// Default configuration path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = read_config()?;
    init_logging(&config.observability.logging.level).context("failed to initialise logging")?;

    tracing::info!(
        symbols = ?config.trading.symbols,
        venues = config.venues.len(),
        agents = config.agents.len(),
        algorithm = ?config.execution.algorithm,
        cycle_interval_secs = config.trading.cycle_interval_seconds,
        "Starting trading core"
    );

    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics.to_metrics_config())
            .context("failed to start metrics exporter")?;
    }

    let shutdown = CancellationToken::new();
    let cycle = Arc::new(build_cycle(&config, shutdown.clone()));
    let symbols = config.trading.symbols();

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let mut ticker = tokio::time::interval(config.trading.cycle_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let results = cycle.run_all(&symbols).await;
                log_cycle_results(&results);
            }
        }
    }

    tracing::info!("Trading core stopped");
    Ok(())
}

/// Resolve the config path and load it.
///
/// A missing default file falls back to built-in defaults; an explicit path
/// must exist.
fn read_config() -> anyhow::Result<Config> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRADING_CORE_CONFIG").ok());

    match explicit {
        Some(path) => {
            load_config(Some(&path)).with_context(|| format!("failed to load config '{path}'"))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("failed to load config.yaml")
        }
        None => Ok(Config::default()),
    }
}

/// Wire venues, breaker, router, scheduler and agents into one cycle.
fn build_cycle(config: &Config, shutdown: CancellationToken) -> TradingCycle {
    let publisher: Arc<dyn EventPublisherPort> = Arc::new(LoggingEventPublisher);

    let listener_publisher = Arc::clone(&publisher);
    let listener: TransitionListener = Arc::new(move |transition: &BreakerTransition| {
        listener_publisher.publish(TradingEvent::BreakerTransition(transition.clone()));
    });
    let breaker = Arc::new(
        CircuitBreaker::with_venues(
            config.circuit_breaker_config(),
            config.venues.iter().map(|v| VenueId::new(v.id.as_str())),
        )
        .with_listener(listener),
    );

    let mut registry = VenueRegistry::new();
    for venue in &config.venues {
        let paper = match venue.seed {
            Some(seed) => PaperVenue::seeded(venue.id.as_str(), venue.paper.clone(), seed),
            None => PaperVenue::new(venue.id.as_str(), venue.paper.clone()),
        };
        registry.register(Arc::new(paper), venue.timeout(config.venue_timeout_seconds));
        tracing::info!(venue = %venue.id, "Paper venue registered");
    }

    let router = PlatformRouter::new(config.preference_table(), Arc::clone(&breaker));
    let dispatcher = VenueDispatcher::new(registry, Arc::clone(&breaker));
    let scheduler = ExecutionScheduler::new(
        router.clone(),
        dispatcher,
        config.obfuscation_config(),
        Arc::clone(&publisher),
        config.scheduler_config(),
    );

    let market_data: Arc<dyn MarketDataPort> = Arc::new(match config.trading.market_data_seed {
        Some(seed) => SyntheticMarketData::seeded(config.trading.market_data.clone(), seed),
        None => SyntheticMarketData::new(config.trading.market_data.clone()),
    });

    TradingCycle::new(
        market_data,
        config.signal_agents(),
        ConsensusEngine::new(config.consensus_config()),
        router,
        scheduler,
        publisher,
        config.cycle_config(),
    )
    .with_shutdown(shutdown)
}

fn log_cycle_results(results: &[(Symbol, Result<CycleReport, CycleError>)]) {
    for (symbol, result) in results {
        match result {
            Ok(report) if report.is_hold() => {
                tracing::debug!(symbol = %symbol, "Cycle held");
            }
            Ok(report) => tracing::info!(
                symbol = %symbol,
                action = %report.decision.action,
                algorithm = ?report.algorithm,
                status = ?report.outcome.as_ref().map(|o| o.status),
                "Cycle finished"
            ),
            Err(e) => tracing::warn!(symbol = %symbol, error = %e, "Cycle failed"),
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for SIGTERM or Ctrl+C, then cancel every in-flight plan.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown.cancel();
}
