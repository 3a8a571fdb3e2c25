//! Shared breaker instances keyed by identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::circuit_breaker::{BreakerConfig, BreakerIdentity, BreakerSnapshot, CircuitBreaker};
use super::clock::{Clock, SystemClock};

/// Owns every circuit breaker in the process.
///
/// Callers asking for the same identity always receive the same instance, so
/// state is shared across every call site and request. Breakers are created
/// lazily with the per-identity configuration if one was registered, or the
/// default otherwise.
#[derive(Debug)]
pub struct BreakerRegistry {
    default_config: BreakerConfig,
    overrides: HashMap<BreakerIdentity, BreakerConfig>,
    breakers: Mutex<HashMap<BreakerIdentity, Arc<CircuitBreaker>>>,
    clock: Arc<dyn Clock>,
}

impl BreakerRegistry {
    /// Create a registry using the system clock.
    #[must_use]
    pub fn new(default_config: BreakerConfig) -> Self {
        Self::with_clock(default_config, Arc::new(SystemClock))
    }

    /// Create a registry with an injected clock.
    #[must_use]
    pub fn with_clock(default_config: BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            default_config,
            overrides: HashMap::new(),
            breakers: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Register a configuration for one identity.
    #[must_use]
    pub fn with_override(mut self, identity: impl Into<BreakerIdentity>, config: BreakerConfig) -> Self {
        self.overrides.insert(identity.into(), config);
        self
    }

    /// Configuration that applies to `identity`.
    #[must_use]
    pub fn config_for(&self, identity: &BreakerIdentity) -> BreakerConfig {
        self.overrides
            .get(identity)
            .copied()
            .unwrap_or(self.default_config)
    }

    /// Get or create the breaker for `identity`.
    pub fn get(&self, identity: impl Into<BreakerIdentity>) -> Arc<CircuitBreaker> {
        let identity = identity.into();
        let mut breakers = self
            .breakers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(existing) = breakers.get(&identity) {
            return Arc::clone(existing);
        }

        let config = self.config_for(&identity);
        tracing::debug!(
            breaker = %identity,
            max_failures = config.max_failures,
            cooldown_secs = config.cooldown.as_secs(),
            "Creating circuit breaker"
        );
        let breaker = Arc::new(CircuitBreaker::new(
            identity.clone(),
            config,
            Arc::clone(&self.clock),
        ));
        breakers.insert(identity, Arc::clone(&breaker));
        breaker
    }

    /// Snapshots of every breaker created so far, sorted by identity.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let breakers: Vec<Arc<CircuitBreaker>> = self
            .breakers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut snapshots: Vec<BreakerSnapshot> = breakers.iter().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}
