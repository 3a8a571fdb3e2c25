//! Runtime table of provider implementations, built from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::{ClearingProvider, ManagementProvider, ProviderError, ProviderLookup};
use crate::config::{ConfigError, ProviderConfig, ProvidersConfig};
use crate::domain::integration::{ClearingProviderId, ManagementProviderId};
use crate::infrastructure::http_client::HttpClient;
use crate::resilience::BreakerRegistry;

use super::creditguard::CreditGuardProvider;
use super::dorix::DorixProvider;
use super::endpoint::ProviderEndpoint;
use super::payplus::PayPlusProvider;
use super::tabit::TabitProvider;

/// Provider implementations keyed by vendor id.
#[derive(Default)]
pub struct ProviderRegistry {
    clearing: HashMap<ClearingProviderId, Arc<dyn ClearingProvider>>,
    management: HashMap<ManagementProviderId, Arc<dyn ManagementProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clearing provider under its own id, replacing any previous one.
    pub fn register_clearing(&mut self, provider: Arc<dyn ClearingProvider>) {
        self.clearing.insert(provider.id(), provider);
    }

    /// Register a management provider under its own id, replacing any previous one.
    pub fn register_management(&mut self, provider: Arc<dyn ManagementProvider>) {
        self.management.insert(provider.id(), provider);
    }

    /// Registered clearing vendors.
    #[must_use]
    pub fn clearing_ids(&self) -> Vec<ClearingProviderId> {
        let mut ids: Vec<_> = self.clearing.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    /// Registered management vendors.
    #[must_use]
    pub fn management_ids(&self) -> Vec<ManagementProviderId> {
        let mut ids: Vec<_> = self.management.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    /// Build every enabled provider.
    ///
    /// Each vendor gets an endpoint on the shared HTTP client and the breaker
    /// named by its configuration.
    pub fn from_config(
        config: &ProvidersConfig,
        http: &HttpClient,
        breakers: &BreakerRegistry,
    ) -> Result<Self, ConfigError> {
        let endpoint = |vendor: &'static str, provider: &ProviderConfig| {
            let settings = provider.to_settings(vendor)?;
            let breaker = breakers.get(provider.breaker_identity(vendor));
            tracing::info!(
                provider = vendor,
                base_url = %settings.base_url,
                breaker = %breaker.identity(),
                "Provider enabled"
            );
            Ok::<_, ConfigError>(ProviderEndpoint::new(vendor, http.clone(), breaker, settings))
        };

        let mut registry = Self::new();
        if config.creditguard.enabled {
            registry.register_clearing(Arc::new(CreditGuardProvider::new(endpoint(
                "creditguard",
                &config.creditguard,
            )?)));
        }
        if config.payplus.enabled {
            registry.register_clearing(Arc::new(PayPlusProvider::new(endpoint(
                "payplus",
                &config.payplus,
            )?)));
        }
        if config.dorix.enabled {
            registry.register_management(Arc::new(DorixProvider::new(endpoint(
                "dorix",
                &config.dorix,
            )?)));
        }
        if config.tabit.enabled {
            registry.register_management(Arc::new(TabitProvider::new(endpoint(
                "tabit",
                &config.tabit,
            )?)));
        }

        Ok(registry)
    }
}

impl ProviderLookup for ProviderRegistry {
    fn clearing(&self, id: ClearingProviderId) -> Result<Arc<dyn ClearingProvider>, ProviderError> {
        self.clearing
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("clearing provider '{id}'")))
    }

    fn management(
        &self,
        id: ManagementProviderId,
    ) -> Result<Arc<dyn ManagementProvider>, ProviderError> {
        self.management
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("management provider '{id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::integration::{ClearingIntegration, ManagementIntegration};
    use crate::domain::shared::VenueId;
    use crate::infrastructure::http_client::HttpClientConfig;
    use crate::resilience::{BreakerConfig, BreakerIdentity};
    use serde_json::json;

    fn http() -> HttpClient {
        HttpClient::new(&HttpClientConfig::default()).unwrap()
    }

    fn enabled(config: &mut ProviderConfig, base_url: &str) {
        config.enabled = true;
        config.base_url = base_url.to_string();
    }

    #[test]
    fn only_enabled_providers_are_registered() {
        let mut config = ProvidersConfig::default();
        enabled(&mut config.payplus, "https://payplus.example.test/api/v1.0");
        enabled(&mut config.tabit, "https://tabit.example.test");

        let registry =
            ProviderRegistry::from_config(&config, &http(), &BreakerRegistry::default()).unwrap();

        assert_eq!(registry.clearing_ids(), [ClearingProviderId::PayPlus]);
        assert_eq!(registry.management_ids(), [ManagementProviderId::Tabit]);
        assert_eq!(
            registry.clearing(ClearingProviderId::PayPlus).unwrap().id(),
            ClearingProviderId::PayPlus
        );
    }

    #[test]
    fn unregistered_provider_is_not_found() {
        let registry = ProviderRegistry::new();

        let clearing = ClearingIntegration {
            venue_id: VenueId::new("v1"),
            provider: ClearingProviderId::CreditGuard,
            credentials: json!({}),
        };
        let management = ManagementIntegration {
            venue_id: VenueId::new("v1"),
            provider: ManagementProviderId::Dorix,
            credentials: json!({}),
        };

        assert!(matches!(
            registry.clearing_for(&clearing),
            Err(ProviderError::NotFound { .. })
        ));
        assert!(matches!(
            registry.management_for(&management),
            Err(ProviderError::NotFound { .. })
        ));
    }

    #[test]
    fn providers_naming_the_same_breaker_share_it() {
        let mut config = ProvidersConfig::default();
        enabled(&mut config.dorix, "https://dorix.example.test");
        enabled(&mut config.tabit, "https://tabit.example.test");
        config.dorix.breaker = Some("pos".to_string());
        config.tabit.breaker = Some("pos".to_string());

        let breakers = BreakerRegistry::new(BreakerConfig::default());
        ProviderRegistry::from_config(&config, &http(), &breakers).unwrap();

        let names: Vec<BreakerIdentity> = breakers.snapshots().into_iter().map(|s| s.name).collect();
        assert_eq!(names, [BreakerIdentity::new("pos")]);
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let mut config = ProvidersConfig::default();
        enabled(&mut config.creditguard, "not a url");

        let result = ProviderRegistry::from_config(&config, &http(), &BreakerRegistry::default());

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
