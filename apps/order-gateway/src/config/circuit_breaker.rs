//! Circuit breaker configuration for resilience.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{BreakerConfig, BreakerRegistry};

/// Circuit breaker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CircuitBreakersConfig {
    /// Settings for every breaker without an override.
    #[serde(default)]
    pub default: CircuitBreakerSettings,
    /// Per-identity overrides, keyed by breaker name.
    #[serde(default)]
    pub identities: BTreeMap<String, CircuitBreakerSettings>,
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    /// Consecutive counted failures that open the circuit.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Time the circuit stays open before a probe is allowed (seconds).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl CircuitBreakerSettings {
    /// Convert config settings to the resilience module's `BreakerConfig`.
    #[must_use]
    pub const fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            max_failures: self.max_failures,
            cooldown: Duration::from_secs(self.cooldown_secs),
        }
    }
}

impl CircuitBreakersConfig {
    /// Build the breaker registry with the default and every override.
    #[must_use]
    pub fn to_registry(&self) -> BreakerRegistry {
        self.identities.iter().fold(
            BreakerRegistry::new(self.default.to_breaker_config()),
            |registry, (identity, settings)| {
                registry.with_override(identity.as_str(), settings.to_breaker_config())
            },
        )
    }

    /// Default settings followed by every override, with their names.
    pub(crate) fn all(&self) -> impl Iterator<Item = (&str, &CircuitBreakerSettings)> {
        std::iter::once(("default", &self.default)).chain(
            self.identities
                .iter()
                .map(|(name, settings)| (name.as_str(), settings)),
        )
    }
}

const fn default_max_failures() -> u32 {
    5
}

const fn default_cooldown_secs() -> u64 {
    30
}
