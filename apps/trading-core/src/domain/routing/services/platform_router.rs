//! Platform Router Domain Service

use chrono::Utc;
use std::sync::Arc;

use crate::domain::consensus::ConsensusDecision;
use crate::domain::execution_tactics::value_objects::OrderSide;
use crate::domain::routing::RoutingError;
use crate::domain::routing::value_objects::{RouteCandidate, RoutingPlan, VenuePreferenceTable};
use crate::domain::shared::{Symbol, VenueId};
use crate::resilience::CircuitBreaker;

/// Orders venues for a symbol and drops those whose breaker is not taking
/// traffic.
///
/// Routing is read-only with respect to the breaker apart from the lazy
/// OPEN → HALF_OPEN refresh an availability check performs.
#[derive(Debug, Clone)]
pub struct PlatformRouter {
    preferences: VenuePreferenceTable,
    breaker: Arc<CircuitBreaker>,
}

impl PlatformRouter {
    /// Create a new router.
    #[must_use]
    pub const fn new(preferences: VenuePreferenceTable, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            preferences,
            breaker,
        }
    }

    /// Preference table.
    #[must_use]
    pub const fn preferences(&self) -> &VenuePreferenceTable {
        &self.preferences
    }

    /// Shared breaker table.
    #[must_use]
    pub const fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Route an actionable decision.
    ///
    /// # Errors
    ///
    /// `NothingToRoute` for HOLD, `NoAvailableVenue` when every candidate is
    /// refused.
    pub fn route(
        &self,
        decision: &ConsensusDecision,
        venue_preference: &[VenueId],
    ) -> Result<RoutingPlan, RoutingError> {
        let Some(side) = decision.action.side() else {
            return Err(RoutingError::NothingToRoute {
                symbol: decision.symbol.clone(),
            });
        };
        self.route_symbol(&decision.symbol, side, venue_preference)
    }

    /// Route one order for a symbol and side.
    ///
    /// # Errors
    ///
    /// `NoAvailableVenue` when every candidate is refused.
    pub fn route_symbol(
        &self,
        symbol: &Symbol,
        side: OrderSide,
        venue_preference: &[VenueId],
    ) -> Result<RoutingPlan, RoutingError> {
        let mut candidates = Vec::new();
        let mut excluded = Vec::new();

        for venue in self.preferences.candidates(symbol.class(), venue_preference) {
            if self.breaker.is_available(&venue) {
                let state = self.breaker.state(&venue);
                candidates.push(RouteCandidate { venue, state });
            } else {
                excluded.push(venue);
            }
        }

        if candidates.is_empty() {
            return Err(RoutingError::NoAvailableVenue {
                symbol: symbol.clone(),
                excluded,
            });
        }

        if !excluded.is_empty() {
            tracing::debug!(
                symbol = %symbol,
                excluded = ?excluded,
                "Venues excluded by circuit breaker"
            );
        }

        Ok(RoutingPlan {
            symbol: symbol.clone(),
            side,
            candidates,
            excluded,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consensus::HoldReason;
    use crate::domain::shared::SymbolClass;
    use crate::domain::signals::TradeAction;
    use crate::resilience::{CircuitBreakerConfig, CircuitState};

    fn router() -> PlatformRouter {
        let table = VenuePreferenceTable::new()
            .with_primary(SymbolClass::Equity, "alpaca")
            .with_primary(SymbolClass::Crypto, "binance")
            .with_fallback("ibkr");
        PlatformRouter::new(
            table,
            Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
        )
    }

    fn trip(router: &PlatformRouter, venue: &str) {
        for _ in 0..5 {
            router.breaker().record_outcome(&VenueId::new(venue), false);
        }
    }

    fn buy(symbol: &str) -> ConsensusDecision {
        let mut decision =
            ConsensusDecision::hold(Symbol::new(symbol), HoldReason::BelowThreshold, vec![]);
        decision.action = TradeAction::Buy;
        decision.confidence = 0.7;
        decision.hold_reason = None;
        decision
    }

    #[test]
    fn route_uses_class_primary_first() {
        let plan = router().route(&buy("AAPL"), &[]).unwrap();
        assert_eq!(plan.primary(), Some(&VenueId::new("alpaca")));
        assert_eq!(plan.side, OrderSide::Buy);
        assert!(plan.excluded.is_empty());
        assert_eq!(plan.candidates[0].state, CircuitState::Closed);
    }

    #[test]
    fn route_crypto_symbol() {
        let plan = router().route(&buy("BTC-USD"), &[]).unwrap();
        let venues: Vec<_> = plan.venues().cloned().collect();
        assert_eq!(venues, vec![VenueId::new("binance"), VenueId::new("ibkr")]);
    }

    #[test]
    fn route_hold_is_rejected() {
        let decision =
            ConsensusDecision::hold(Symbol::new("AAPL"), HoldReason::BelowThreshold, vec![]);
        let err = router().route(&decision, &[]).unwrap_err();
        assert!(matches!(err, RoutingError::NothingToRoute { .. }));
    }

    #[test]
    fn route_skips_open_primary() {
        let table = VenuePreferenceTable::new()
            .with_primary(SymbolClass::Equity, "alpaca")
            .with_fallback("ibkr")
            .with_fallback("coinbase");
        let router = PlatformRouter::new(
            table,
            Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
        );
        trip(&router, "alpaca");

        let plan = router.route(&buy("AAPL"), &[]).unwrap();
        let venues: Vec<_> = plan.venues().cloned().collect();
        assert_eq!(venues, vec![VenueId::new("ibkr"), VenueId::new("coinbase")]);
        assert!(plan.candidates.iter().all(|c| c.state == CircuitState::Closed));
        assert_eq!(plan.excluded, vec![VenueId::new("alpaca")]);
    }

    #[test]
    fn route_all_open_is_no_available_venue() {
        let router = router();
        trip(&router, "alpaca");
        trip(&router, "ibkr");

        let err = router.route(&buy("AAPL"), &[]).unwrap_err();
        assert_eq!(
            err,
            RoutingError::NoAvailableVenue {
                symbol: Symbol::new("AAPL"),
                excluded: vec![VenueId::new("alpaca"), VenueId::new("ibkr")],
            }
        );
    }

    #[test]
    fn route_explicit_preference_leads() {
        let plan = router()
            .route_symbol(&Symbol::new("AAPL"), OrderSide::Sell, &[VenueId::new("ibkr")])
            .unwrap();
        let venues: Vec<_> = plan.venues().cloned().collect();
        assert_eq!(venues, vec![VenueId::new("ibkr"), VenueId::new("alpaca")]);
    }
}
