//! Provider endpoints: one block per clearing and point-of-sale vendor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;
use crate::infrastructure::providers::ProviderSettings;
use crate::resilience::BreakerIdentity;

/// Provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// CreditGuard clearing gateway.
    #[serde(default = "default_creditguard")]
    pub creditguard: ProviderConfig,
    /// PayPlus clearing API.
    #[serde(default = "default_payplus")]
    pub payplus: ProviderConfig,
    /// Dorix POS API.
    #[serde(default = "default_dorix")]
    pub dorix: ProviderConfig,
    /// Tabit POS API.
    #[serde(default = "default_tabit")]
    pub tabit: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            creditguard: default_creditguard(),
            payplus: default_payplus(),
            dorix: default_dorix(),
            tabit: default_tabit(),
        }
    }
}

impl ProvidersConfig {
    /// Every provider block with its vendor name.
    #[must_use]
    pub fn all(&self) -> [(&'static str, &ProviderConfig); 4] {
        [
            ("creditguard", &self.creditguard),
            ("payplus", &self.payplus),
            ("dorix", &self.dorix),
            ("tabit", &self.tabit),
        ]
    }
}

/// Settings for one vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Register this vendor at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Root of the vendor API.
    #[serde(default)]
    pub base_url: String,
    /// Breaker identity. Defaults to the vendor name; vendors naming the
    /// same breaker share its state.
    #[serde(default)]
    pub breaker: Option<String>,
    /// Vendor result codes that mean success.
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<String>,
    /// Per-request deadline overriding `http_client.timeout_ms`.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Notification URL handed to the vendor.
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl ProviderConfig {
    fn disabled(base_url: &str) -> Self {
        Self {
            enabled: false,
            base_url: base_url.to_string(),
            breaker: None,
            success_codes: default_success_codes(),
            timeout_ms: None,
            callback_url: None,
        }
    }

    /// Breaker this vendor's calls go through.
    #[must_use]
    pub fn breaker_identity(&self, vendor: &str) -> BreakerIdentity {
        BreakerIdentity::new(
            self.breaker
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(vendor),
        )
    }

    /// Resolve into endpoint settings.
    pub fn to_settings(&self, vendor: &str) -> Result<ProviderSettings, ConfigError> {
        let base_url = Url::parse(self.base_url.trim()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "providers.{vendor}.base_url '{}' is not a valid URL: {e}",
                self.base_url
            ))
        })?;
        let callback_url = self
            .callback_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| {
                Url::parse(u.trim()).map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "providers.{vendor}.callback_url '{u}' is not a valid URL: {e}"
                    ))
                })
            })
            .transpose()?;

        Ok(ProviderSettings {
            base_url,
            success_codes: self
                .success_codes
                .iter()
                .map(|c| c.trim().to_string())
                .collect(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            callback_url,
        })
    }
}

fn default_success_codes() -> Vec<String> {
    vec!["000".to_string()]
}

fn default_creditguard() -> ProviderConfig {
    ProviderConfig::disabled("https://cguat2.creditguard.co.il")
}

fn default_payplus() -> ProviderConfig {
    ProviderConfig::disabled("https://restapidev.payplus.co.il/api/v1.0")
}

fn default_dorix() -> ProviderConfig {
    ProviderConfig::disabled("https://api.dorix.com")
}

fn default_tabit() -> ProviderConfig {
    ProviderConfig::disabled("https://ros-api.tabit.cloud")
}
