//! Integration tests for running execution plans against scripted venues.
//!
//! Every test runs on a paused clock so slice offsets, resting timeouts and
//! retry backoff are observed exactly.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::Instant;
use tokio_stream::StreamExt;

use trading_core::domain::execution_tactics::{
    AlgorithmKind, ExecutionParams, ExecutionStatus, IcebergConfig, OrderKind, OrderSide,
    SliceStatus, SliceType, SniperConfig, TwapConfig, VwapConfig, build_plan,
};
use trading_core::domain::obfuscation::ObfuscationConfig;
use trading_core::resilience::{CircuitBreakerConfig, CircuitState};

use common::{Harness, ScriptedVenue, Step, equity_table, parent};

fn twap_params(window_seconds: u64, slice_count: u32) -> ExecutionParams {
    ExecutionParams {
        twap: TwapConfig::new(window_seconds, slice_count, SliceType::Market),
        ..ExecutionParams::default()
    }
}

fn iceberg_params(visible: Decimal, max_idle_peaks: u32) -> ExecutionParams {
    ExecutionParams {
        iceberg: IcebergConfig {
            visible_size: visible,
            peak_timeout_seconds: 10,
            min_interval_ms: 500,
            max_idle_peaks,
        },
        ..ExecutionParams::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_twap_spreads_equal_slices_across_window() {
    let venue = ScriptedVenue::new("alpaca", Step::Fill);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(100)),
        AlgorithmKind::Twap,
        &twap_params(600, 10),
    )
    .unwrap();

    let start = Instant::now();
    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.filled, dec!(100));
    assert_eq!(outcome.remaining, dec!(0));
    assert!(outcome.failure.is_none());

    let placed = venue.placed();
    assert_eq!(placed.len(), 10);
    for (i, order) in placed.iter().enumerate() {
        assert_eq!(order.request.quantity, dec!(10));
        assert_eq!(order.request.kind, OrderKind::Market);
        assert_eq!(order.at - start, Duration::from_secs(60 * i as u64));
    }
}

#[tokio::test(start_paused = true)]
async fn test_obfuscated_twap_still_fills_parent_exactly() {
    let venue = ScriptedVenue::new("alpaca", Step::Fill);
    let harness = Harness::with(
        &[venue.clone()],
        equity_table("alpaca", &[]),
        CircuitBreakerConfig::default(),
        ObfuscationConfig::default(),
        Duration::from_secs(5),
    );
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(100)),
        AlgorithmKind::Twap,
        &twap_params(600, 10),
    )
    .unwrap();

    let start = Instant::now();
    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.filled, dec!(100));

    let placed = venue.placed();
    assert_eq!(placed.len(), 10);
    assert_eq!(placed.iter().map(|p| p.request.quantity).sum::<Decimal>(), dec!(100));
    for (i, order) in placed.iter().take(9).enumerate() {
        let quantity = order.request.quantity;
        assert!(quantity >= dec!(9.8) && quantity <= dec!(10.2), "slice {i} size {quantity}");

        let delay = order.at - start - Duration::from_secs(60 * i as u64);
        assert!(
            delay >= Duration::from_millis(100) && delay <= Duration::from_millis(1500),
            "slice {i} jitter {delay:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_iceberg_refreshes_peaks_until_filled() {
    let venue = ScriptedVenue::new("alpaca", Step::Fill);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Sell, dec!(23)),
        AlgorithmKind::Iceberg,
        &iceberg_params(dec!(5), 3),
    )
    .unwrap();

    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.filled, dec!(23));
    assert_eq!(
        venue.quantities(),
        vec![dec!(5), dec!(5), dec!(5), dec!(5), dec!(3)]
    );
    assert!(venue.placed().iter().all(|p| p.request.kind == OrderKind::Limit));

    let indices: Vec<usize> = outcome.slices.iter().map(|s| s.slice_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_iceberg_gives_up_after_idle_peaks() {
    let venue = ScriptedVenue::new("alpaca", Step::Rest);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(23)),
        AlgorithmKind::Iceberg,
        &iceberg_params(dec!(5), 2),
    )
    .unwrap();

    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::PartiallyFailed);
    assert_eq!(venue.placed().len(), 2);
    assert_eq!(venue.cancels(), 2);
    assert!(outcome.slices.iter().all(|s| s.status == SliceStatus::Unfilled));

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.filled, dec!(0));
    assert_eq!(failure.remaining, dec!(23));
    assert!(failure.cause.contains("filled nothing"));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_unfilled_remainder() {
    let venue = ScriptedVenue::scripted("alpaca", &[Step::Fill, Step::Fill], Step::Fail);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(100)),
        AlgorithmKind::Twap,
        &twap_params(400, 4),
    )
    .unwrap();

    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::PartiallyFailed);
    assert_eq!(outcome.filled, dec!(50));
    assert_eq!(outcome.remaining, dec!(50));

    // Two fills, then the third slice fails twice and the plan stops.
    assert_eq!(venue.placed().len(), 4);
    assert_eq!(outcome.slices.len(), 3);
    let last = outcome.slices.last().unwrap();
    assert_eq!(last.status, SliceStatus::Failed);
    assert_eq!(last.attempts, 2);
    assert!(last.error.is_some());

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.filled, dec!(50));
    assert_eq!(failure.remaining, dec!(50));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_remaining_slices() {
    let venue = ScriptedVenue::new("alpaca", Step::Fill);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(100)),
        AlgorithmKind::Twap,
        &twap_params(600, 10),
    )
    .unwrap();

    let mut handle = harness.scheduler.run(plan);
    let reports = handle.stream();
    tokio::time::sleep(Duration::from_secs(90)).await;
    handle.cancel();
    let outcome = handle.outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
    assert_eq!(outcome.filled, dec!(20));
    assert_eq!(outcome.remaining, dec!(80));
    assert!(outcome.failure.is_none());
    assert_eq!(venue.placed().len(), 2);

    let streamed: Vec<_> = reports.collect().await;
    assert_eq!(streamed.len(), 2);
    assert_eq!(streamed[1].cumulative_filled, dec!(20));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_cancels_resting_order() {
    let venue = ScriptedVenue::new("alpaca", Step::Rest);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Sniper,
        &ExecutionParams::default(),
    )
    .unwrap();

    let handle = harness.scheduler.run(plan);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!handle.is_finished());
    handle.cancel();
    let outcome = handle.outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
    assert_eq!(venue.cancels(), 1);
    assert_eq!(outcome.slices.len(), 1);
    assert_eq!(outcome.slices[0].status, SliceStatus::Cancelled);
    assert_eq!(outcome.remaining, dec!(10));
}

#[tokio::test(start_paused = true)]
async fn test_failed_primary_fails_over_to_fallback() {
    let alpaca = ScriptedVenue::new("alpaca", Step::Fail);
    let ibkr = ScriptedVenue::new("ibkr", Step::Fill);
    let harness = Harness::new(&[alpaca.clone(), ibkr.clone()], equity_table("alpaca", &["ibkr"]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Market,
        &ExecutionParams::default(),
    )
    .unwrap();

    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(alpaca.placed().len(), 1);
    assert_eq!(ibkr.placed().len(), 1);
    assert_eq!(outcome.slices[0].venue, Some(ibkr.id()));
    assert_eq!(outcome.slices[0].attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_open_circuit_is_skipped_for_later_slices() {
    let alpaca = ScriptedVenue::new("alpaca", Step::Fail);
    let ibkr = ScriptedVenue::new("ibkr", Step::Fill);
    let harness = Harness::with(
        &[alpaca.clone(), ibkr.clone()],
        equity_table("alpaca", &["ibkr"]),
        CircuitBreakerConfig {
            failure_threshold: 2,
            ..CircuitBreakerConfig::default()
        },
        ObfuscationConfig::disabled(),
        Duration::from_secs(5),
    );
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(40)),
        AlgorithmKind::Twap,
        &twap_params(40, 4),
    )
    .unwrap();

    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(alpaca.placed().len(), 2);
    assert_eq!(ibkr.placed().len(), 4);
    assert_eq!(
        harness.breaker.state(&alpaca.id()),
        CircuitState::Open
    );
}

#[tokio::test(start_paused = true)]
async fn test_hanging_venue_times_out_then_fails_over() {
    let alpaca = ScriptedVenue::new("alpaca", Step::Hang);
    let ibkr = ScriptedVenue::new("ibkr", Step::Fill);
    let harness = Harness::with(
        &[alpaca.clone(), ibkr.clone()],
        equity_table("alpaca", &["ibkr"]),
        CircuitBreakerConfig::default(),
        ObfuscationConfig::disabled(),
        Duration::from_secs(2),
    );
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Market,
        &ExecutionParams::default(),
    )
    .unwrap();

    let start = Instant::now();
    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.slices[0].venue, Some(ibkr.id()));
    assert_eq!(ibkr.placed()[0].at - start, Duration::from_secs(2));
    assert_eq!(
        harness.breaker.health(&alpaca.id()).consecutive_failures(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_vwap_sizes_follow_volume_curve_buckets() {
    let venue = ScriptedVenue::new("alpaca", Step::Fill);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let params = ExecutionParams {
        vwap: VwapConfig::new(
            400,
            vec![dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.4)],
            SliceType::Market,
        ),
        ..ExecutionParams::default()
    };
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(100)),
        AlgorithmKind::Vwap,
        &params,
    )
    .unwrap();

    let start = Instant::now();
    let outcome = harness.scheduler.run(plan).outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.filled, dec!(100));
    assert_eq!(
        venue.quantities(),
        vec![dec!(10), dec!(20), dec!(30), dec!(40)]
    );
    let offsets: Vec<Duration> = venue.placed().iter().map(|p| p.at - start).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_secs(100),
            Duration::from_secs(200),
            Duration::from_secs(300),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sniper_expires_unfilled_and_cancels_at_venue() {
    let venue = ScriptedVenue::new("alpaca", Step::Rest);
    let harness = Harness::new(&[venue.clone()], equity_table("alpaca", &[]));
    let params = ExecutionParams {
        sniper: SniperConfig {
            target_price: Some(dec!(95)),
            expiry_seconds: 120,
        },
        ..ExecutionParams::default()
    };
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Sniper,
        &params,
    )
    .unwrap();

    let start = Instant::now();
    let outcome = harness.scheduler.run(plan).outcome().await;

    assert!(start.elapsed() >= Duration::from_secs(120));
    assert_eq!(venue.cancels(), 1);
    assert!(venue.live_orders().is_empty());
    assert_eq!(venue.placed()[0].request.limit_price, Some(dec!(95)));

    assert_eq!(outcome.status, ExecutionStatus::PartiallyFailed);
    assert_eq!(outcome.slices.len(), 1);
    assert_eq!(outcome.slices[0].status, SliceStatus::Unfilled);
    let failure = outcome.failure.unwrap();
    assert_eq!(failure.filled, dec!(0));
    assert_eq!(failure.remaining, dec!(10));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_slow_placement_cancels_order_once_acked() {
    let venue = ScriptedVenue::new("slow", Step::SlowRest(Duration::from_secs(3)));
    let harness = Harness::new(&[venue.clone()], equity_table("slow", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Market,
        &ExecutionParams::default(),
    )
    .unwrap();

    let handle = harness.scheduler.run(plan);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(venue.placed().len(), 1);
    handle.cancel();
    let outcome = handle.outcome().await;

    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
    assert_eq!(venue.cancels(), 1);
    assert!(venue.live_orders().is_empty());

    assert_eq!(outcome.slices.len(), 1);
    let slice = &outcome.slices[0];
    assert_eq!(slice.status, SliceStatus::Cancelled);
    assert_eq!(slice.venue, Some(venue.id()));
    assert_eq!(outcome.remaining, dec!(10));

    // The acknowledged placement still counted as a success.
    assert_eq!(harness.breaker.health(&venue.id()).consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fill_arriving_after_cancel_is_accounted() {
    let venue = ScriptedVenue::new("slow", Step::SlowFill(Duration::from_secs(3)));
    let harness = Harness::new(&[venue.clone()], equity_table("slow", &[]));
    let plan = build_plan(
        parent("AAPL", OrderSide::Buy, dec!(10)),
        AlgorithmKind::Market,
        &ExecutionParams::default(),
    )
    .unwrap();

    let handle = harness.scheduler.run(plan);
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();
    let outcome = handle.outcome().await;

    assert_eq!(venue.cancels(), 0);
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.slices.len(), 1);
    assert_eq!(outcome.slices[0].status, SliceStatus::Filled);
    assert_eq!(outcome.filled, dec!(10));
    assert_eq!(outcome.remaining, dec!(0));
}
