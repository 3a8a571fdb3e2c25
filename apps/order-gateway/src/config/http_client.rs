//! Outbound HTTP client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::http_client::HttpClientConfig;

/// Outbound HTTP client settings shared by every provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientSettings {
    /// Default per-request deadline (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// `User-Agent` override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: None,
        }
    }
}

impl HttpClientSettings {
    /// Convert to the HTTP client's configuration.
    #[must_use]
    pub fn to_client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}
