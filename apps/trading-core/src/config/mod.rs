//! Configuration module for the trading core.
//!
//! Loads the YAML configuration, interpolates environment variables and
//! validates the result. Converters turn each section into the domain and
//! service configuration types.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trading_core::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Build domain configs
//! let consensus = config.consensus_config();
//! let breaker = config.circuit_breaker_config();
//! ```

mod agents;
mod execution;
mod obfuscation;
mod observability;
mod routing;
mod trading;
mod venues;

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use agents::{AgentConfig, agent_weights, build_agents};
pub use execution::{AlgorithmSetting, ExecutionConfig, RetrySettings};
pub use obfuscation::{JitterRange, ObfuscationSettings};
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use routing::RoutingConfig;
pub use trading::TradingConfig;
pub use venues::VenueConfig;

use crate::application::services::{CycleConfig, SchedulerConfig};
use crate::domain::consensus::ConsensusConfig;
use crate::domain::obfuscation::ObfuscationConfig;
use crate::domain::routing::VenuePreferenceTable;
use crate::domain::shared::Symbol;
use crate::domain::signals::SignalAgent;
use crate::resilience::CircuitBreakerConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Weighted score BUY or SELL must reach to beat HOLD.
    pub consensus_threshold: f64,
    /// Consecutive failures that open a venue's circuit.
    pub circuit_failure_threshold: u32,
    /// Seconds an open circuit waits before probing.
    pub circuit_cooldown_seconds: u64,
    /// Consecutive probe successes that close a half-open circuit.
    pub circuit_recovery_successes: u32,
    /// Default per-call venue timeout.
    pub venue_timeout_seconds: u64,
    /// Relative child-order size fuzz.
    pub quantity_fuzz_range: f64,
    /// Submit jitter bounds.
    pub timing_jitter_ms: JitterRange,
    /// Signal agent roster.
    pub agents: Vec<AgentConfig>,
    /// Trading venues.
    pub venues: Vec<VenueConfig>,
    /// Venue preference per symbol class.
    pub routing: RoutingConfig,
    /// Execution algorithm settings.
    pub execution: ExecutionConfig,
    /// Obfuscation switches.
    pub obfuscation: ObfuscationSettings,
    /// Symbols and cycle cadence.
    pub trading: TradingConfig,
    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consensus_threshold: 0.60,
            circuit_failure_threshold: 5,
            circuit_cooldown_seconds: 60,
            circuit_recovery_successes: 3,
            venue_timeout_seconds: 5,
            quantity_fuzz_range: 0.02,
            timing_jitter_ms: JitterRange::default(),
            agents: agents::default_agents(),
            venues: venues::default_venues(),
            routing: RoutingConfig::default(),
            execution: ExecutionConfig::default(),
            obfuscation: ObfuscationSettings::default(),
            trading: TradingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Consensus engine configuration with per-agent weights.
    #[must_use]
    pub fn consensus_config(&self) -> ConsensusConfig {
        ConsensusConfig::with_threshold(self.consensus_threshold)
            .with_weights(agent_weights(&self.agents))
    }

    /// Build the configured signal agents.
    #[must_use]
    pub fn signal_agents(&self) -> Vec<SignalAgent> {
        build_agents(&self.agents)
    }

    /// Circuit breaker thresholds.
    #[must_use]
    pub const fn circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.circuit_failure_threshold,
            cooldown: Duration::from_secs(self.circuit_cooldown_seconds),
            recovery_successes: self.circuit_recovery_successes,
        }
    }

    /// Obfuscation settings merged with the top-level fuzz and jitter.
    #[must_use]
    pub const fn obfuscation_config(&self) -> ObfuscationConfig {
        ObfuscationConfig {
            enabled: self.obfuscation.enabled,
            quantity_fuzz_range: self.quantity_fuzz_range,
            jitter_min_ms: self.timing_jitter_ms.min,
            jitter_max_ms: self.timing_jitter_ms.max,
            max_price_offset_bps: self.obfuscation.max_price_offset_bps,
        }
    }

    /// Routing preference table.
    #[must_use]
    pub fn preference_table(&self) -> VenuePreferenceTable {
        self.routing.to_preference_table()
    }

    /// Default venue call timeout.
    #[must_use]
    pub const fn venue_timeout(&self) -> Duration {
        Duration::from_secs(self.venue_timeout_seconds)
    }

    /// Execution scheduler settings.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            fill_poll_interval: self.execution.fill_poll_interval(),
            fill_timeout: self.execution.market_fill_timeout(),
            retry: self.execution.retry.to_retry_policy(),
            venue_preference: self.routing.venue_preference(),
            obfuscation_seed: self.obfuscation.seed,
        }
    }

    /// Per-cycle trading settings.
    #[must_use]
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            order_sizes: self.trading.order_sizes(),
            default_order_size: self.trading.default_order_size,
            algorithm: self.execution.algorithm.fixed(),
            params: self.execution.params.clone(),
            urgency_cutoff: self.execution.urgency_cutoff,
            volume_window: self.execution.volume_window,
            venue_preference: self.routing.venue_preference(),
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

pub(crate) const fn default_true() -> bool {
    true
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the first offending option.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !(config.consensus_threshold > 0.0 && config.consensus_threshold <= 1.0) {
        return Err(invalid("consensus_threshold must be in (0.0, 1.0]"));
    }

    if config.circuit_failure_threshold == 0 {
        return Err(invalid("circuit_failure_threshold must be at least 1"));
    }

    if config.circuit_recovery_successes == 0 {
        return Err(invalid("circuit_recovery_successes must be at least 1"));
    }

    if config.venue_timeout_seconds == 0 {
        return Err(invalid("venue_timeout_seconds must be positive"));
    }

    config
        .obfuscation_config()
        .validate()
        .map_err(|e| invalid(e.to_string()))?;

    validate_agents(&config.agents)?;
    let venues = validate_venues(&config.venues)?;

    for venue in config.routing.referenced_venues() {
        if !venues.contains(venue) {
            return Err(invalid(format!("routing references unknown venue '{venue}'")));
        }
    }

    validate_execution(&config.execution)?;
    validate_trading(&config.trading)?;

    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ConfigError> {
    if agents.is_empty() {
        return Err(invalid("at least one agent must be configured"));
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if agent.id.trim().is_empty() {
            return Err(invalid("agent id cannot be empty"));
        }
        if !seen.insert(agent.id.as_str()) {
            return Err(invalid(format!("duplicate agent id '{}'", agent.id)));
        }
        if !agent.weight.is_finite() || agent.weight <= 0.0 {
            return Err(invalid(format!(
                "agent '{}' weight must be positive",
                agent.id
            )));
        }
    }

    Ok(())
}

fn validate_venues(venues: &[VenueConfig]) -> Result<HashSet<&str>, ConfigError> {
    if venues.is_empty() {
        return Err(invalid("at least one venue must be configured"));
    }

    let mut seen = HashSet::new();
    for venue in venues {
        if venue.id.trim().is_empty() {
            return Err(invalid("venue id cannot be empty"));
        }
        if !seen.insert(venue.id.as_str()) {
            return Err(invalid(format!("duplicate venue id '{}'", venue.id)));
        }
        if venue.timeout_seconds == Some(0) {
            return Err(invalid(format!(
                "venue '{}' timeout_seconds must be positive",
                venue.id
            )));
        }
        let paper = &venue.paper;
        for (name, rate) in [
            ("failure_rate", paper.failure_rate),
            ("reject_rate", paper.reject_rate),
            ("resting_fill_ratio", paper.resting_fill_ratio),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!(
                    "venue '{}' paper.{name} must be between 0.0 and 1.0",
                    venue.id
                )));
            }
        }
    }

    Ok(seen)
}

fn validate_execution(execution: &ExecutionConfig) -> Result<(), ConfigError> {
    let params = &execution.params;

    if params.twap.slice_count == 0 {
        return Err(invalid("execution.twap.slice_count must be at least 1"));
    }

    if params.iceberg.visible_size <= rust_decimal::Decimal::ZERO {
        return Err(invalid("execution.iceberg.visible_size must be positive"));
    }

    if params
        .lot_size
        .is_some_and(|lot| lot <= rust_decimal::Decimal::ZERO)
    {
        return Err(invalid("execution.lot_size must be positive"));
    }

    if execution.fill_poll_interval_ms == 0 {
        return Err(invalid("execution.fill_poll_interval_ms must be positive"));
    }

    if !(0.0..=1.0).contains(&execution.urgency_cutoff) {
        return Err(invalid("execution.urgency_cutoff must be between 0.0 and 1.0"));
    }

    let retry = &execution.retry;
    if retry.multiplier < 1.0 || !(0.0..=1.0).contains(&retry.jitter) {
        return Err(invalid(
            "execution.retry.multiplier must be >= 1.0 and jitter between 0.0 and 1.0",
        ));
    }

    Ok(())
}

fn validate_trading(trading: &TradingConfig) -> Result<(), ConfigError> {
    if trading.symbols.is_empty() {
        return Err(invalid("trading.symbols cannot be empty"));
    }

    for symbol in trading.symbols() {
        symbol
            .validate()
            .map_err(|e| invalid(format!("trading.symbols: {e}")))?;
    }

    if trading.cycle_interval_seconds == 0 {
        return Err(invalid("trading.cycle_interval_seconds must be positive"));
    }

    if trading.default_order_size <= rust_decimal::Decimal::ZERO {
        return Err(invalid("trading.default_order_size must be positive"));
    }

    if let Some((symbol, _)) = trading
        .order_sizes
        .iter()
        .find(|(_, size)| **size <= rust_decimal::Decimal::ZERO)
    {
        return Err(invalid(format!(
            "trading.order_sizes.{} must be positive",
            Symbol::new(symbol)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;
    use crate::domain::execution_tactics::AlgorithmKind;
    use crate::domain::shared::{AgentId, SymbolClass, VenueId};
    use crate::domain::signals::SignalSource;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.consensus_threshold - 0.60).abs() < f64::EPSILON);
        assert_eq!(config.circuit_failure_threshold, 5);
        assert_eq!(config.circuit_cooldown_seconds, 60);
        assert_eq!(config.circuit_recovery_successes, 3);
        assert_eq!(config.venue_timeout_seconds, 5);
        assert_eq!(config.timing_jitter_ms.min, 100);
        assert_eq!(config.timing_jitter_ms.max, 1500);
        assert_eq!(config.agents.len(), 4);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let config = match load_config_from_string("consensus_threshold: 0.7\n") {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert!((config.consensus_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.venue_timeout_seconds, 5);
        assert_eq!(config.execution.algorithm, AlgorithmSetting::Auto);
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${TRADING_CORE_TEST_NONEXISTENT_VAR:-debug}";
        assert_eq!(interpolate_env_vars(input), "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "seed: ${TRADING_CORE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "seed: ");
    }

    #[test_case("consensus_threshold: 0.0", "consensus_threshold" ; "zero threshold")]
    #[test_case("consensus_threshold: 1.5", "consensus_threshold" ; "threshold above one")]
    #[test_case("circuit_failure_threshold: 0", "circuit_failure_threshold" ; "zero failures")]
    #[test_case("circuit_recovery_successes: 0", "circuit_recovery_successes" ; "zero recoveries")]
    #[test_case("venue_timeout_seconds: 0", "venue_timeout_seconds" ; "zero timeout")]
    #[test_case("quantity_fuzz_range: 1.5", "quantity_fuzz_range" ; "fuzz too wide")]
    #[test_case("timing_jitter_ms: { min: 2000, max: 100 }", "jitter" ; "inverted jitter")]
    #[test_case("agents: []", "agent" ; "no agents")]
    #[test_case("venues: []", "venue" ; "no venues")]
    #[test_case("trading: { symbols: [] }", "symbols" ; "no symbols")]
    #[test_case("trading: { cycle_interval_seconds: 0 }", "cycle_interval_seconds" ; "zero interval")]
    #[test_case("execution: { twap: { slice_count: 0 } }", "slice_count" ; "zero slices")]
    fn test_validation_rejects(yaml: &str, expected: &str) {
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected validation error for {yaml}");
        };
        assert!(
            err.to_string().contains(expected),
            "error '{err}' should mention {expected}"
        );
    }

    #[test]
    fn test_validation_unknown_routing_venue() {
        let yaml = r"
venues:
  - id: alpaca
routing:
  primary:
    equity: alpaca
    crypto: kraken
  fallback: [alpaca]
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for unknown venue");
        };
        assert!(err.to_string().contains("kraken"));
    }

    #[test]
    fn test_validation_duplicate_agent() {
        let yaml = r"
agents:
  - id: momentum
    kind: momentum
  - id: momentum
    kind: mean_reversion
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate agent");
        };
        assert!(err.to_string().contains("duplicate agent id"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
consensus_threshold: 0.55
circuit_failure_threshold: 3
circuit_cooldown_seconds: 30
circuit_recovery_successes: 2
venue_timeout_seconds: 4
quantity_fuzz_range: 0.05
timing_jitter_ms:
  min: 50
  max: 500

agents:
  - id: fast_momentum
    kind: momentum
    lookback: 5
    weight: 2.0
  - id: reversion
    kind: mean_reversion

venues:
  - id: alpaca
    timeout_seconds: 2
    paper:
      reject_rate: 0.1
  - id: ibkr
    seed: 7

routing:
  primary:
    equity: alpaca
    option: ibkr
  fallback: [ibkr]
  preference: [ibkr]

execution:
  algorithm: TWAP
  twap:
    window_seconds: 120
    slice_count: 4
  iceberg:
    visible_size: 25
  lot_size: 1
  retry:
    max_retries: 2
    initial_backoff_ms: 100
  fill_poll_interval_ms: 500

obfuscation:
  enabled: false
  max_price_offset_bps: 10
  seed: 42

trading:
  symbols: [aapl, BTC-USD]
  cycle_interval_seconds: 15
  order_sizes:
    AAPL: 100
  default_order_size: "0.5"

observability:
  logging:
    level: debug
  metrics:
    enabled: true
    listen_addr: "127.0.0.1:9100"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        let consensus = config.consensus_config();
        assert!((consensus.threshold - 0.55).abs() < f64::EPSILON);
        assert_eq!(consensus.weights.weight_for(&AgentId::new("fast_momentum")), 2.0);
        assert_eq!(consensus.weights.weight_for(&AgentId::new("reversion")), 1.0);

        let agents = config.signal_agents();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].id().as_str(), "fast_momentum");

        let breaker = config.circuit_breaker_config();
        assert_eq!(breaker.failure_threshold, 3);
        assert_eq!(breaker.cooldown, Duration::from_secs(30));
        assert_eq!(breaker.recovery_successes, 2);

        assert_eq!(config.venues[0].timeout(config.venue_timeout_seconds), Duration::from_secs(2));
        assert_eq!(config.venues[1].timeout(config.venue_timeout_seconds), Duration::from_secs(4));
        assert!((config.venues[0].paper.reject_rate - 0.1).abs() < f64::EPSILON);

        let table = config.preference_table();
        assert_eq!(table.primary.get(&SymbolClass::Option), Some(&VenueId::new("ibkr")));
        assert_eq!(table.fallback, vec![VenueId::new("ibkr")]);

        let obfuscation = config.obfuscation_config();
        assert!(!obfuscation.enabled);
        assert_eq!(obfuscation.jitter_min_ms, 50);
        assert_eq!(obfuscation.max_price_offset_bps, 10);

        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.fill_poll_interval, Duration::from_millis(500));
        assert_eq!(scheduler.retry.max_retries, 2);
        assert_eq!(scheduler.retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(scheduler.venue_preference, vec![VenueId::new("ibkr")]);
        assert_eq!(scheduler.obfuscation_seed, Some(42));

        let cycle = config.cycle_config();
        assert_eq!(cycle.algorithm, Some(AlgorithmKind::Twap));
        assert_eq!(cycle.params.twap.slice_count, 4);
        assert_eq!(cycle.params.iceberg.visible_size, dec!(25));
        assert_eq!(cycle.params.lot_size, Some(dec!(1)));
        assert_eq!(cycle.order_size(&Symbol::new("AAPL")), dec!(100));
        assert_eq!(cycle.order_size(&Symbol::new("BTC-USD")), dec!(0.5));

        assert_eq!(
            config.trading.symbols(),
            vec![Symbol::new("AAPL"), Symbol::new("BTC-USD")]
        );
        assert_eq!(config.observability.logging.level, "debug");
        assert!(config.observability.metrics.enabled);
        assert_eq!(config.observability.metrics.listen_addr.port(), 9100);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "consensus_threshold: 0.65").unwrap();
        writeln!(file, "trading:").unwrap();
        writeln!(file, "  symbols: [MSFT]").unwrap();

        let path = file.path().to_str().unwrap();
        let config = load_config(Some(path)).unwrap();
        assert!((config.consensus_threshold - 0.65).abs() < f64::EPSILON);
        assert_eq!(config.trading.symbols(), vec![Symbol::new("MSFT")]);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let Err(err) = load_config(path.to_str()) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_env_interpolation_in_config() {
        let yaml = "venue_timeout_seconds: ${TRADING_CORE_TEST_TIMEOUT_UNSET:-9}\n";
        let config = load_config_from_string(yaml).unwrap();
        assert_eq!(config.venue_timeout(), Duration::from_secs(9));
    }
}
