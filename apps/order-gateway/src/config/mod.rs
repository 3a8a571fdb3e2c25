//! Configuration module for the order gateway.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the gateway's server, outbound client, breakers and
//! providers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_gateway::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod circuit_breaker;
mod http_client;
mod observability;
mod persistence;
mod providers;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use circuit_breaker::{CircuitBreakerSettings, CircuitBreakersConfig};
pub use http_client::HttpClientSettings;
pub use observability::{LOG_FORMATS, LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use persistence::PersistenceConfig;
pub use providers::{ProviderConfig, ProvidersConfig};
pub use server::ServerConfig;

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
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound HTTP client configuration.
    #[serde(default)]
    pub http_client: HttpClientSettings,
    /// Circuit breaker configuration.
    #[serde(default)]
    pub circuit_breakers: CircuitBreakersConfig,
    /// Provider configuration.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Repository configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
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
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }

    if config.http_client.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "http_client.timeout_ms must be positive".to_string(),
        ));
    }

    for (name, settings) in config.circuit_breakers.all() {
        if settings.max_failures == 0 {
            return Err(ConfigError::ValidationError(format!(
                "circuit_breakers.{name}.max_failures must be at least 1"
            )));
        }
        if settings.cooldown_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "circuit_breakers.{name}.cooldown_secs must be positive"
            )));
        }
    }

    for (vendor, provider) in config.providers.all() {
        if provider.success_codes.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "providers.{vendor}.success_codes must not be empty"
            )));
        }
        if !provider.enabled {
            continue;
        }
        if provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "providers.{vendor}.base_url is required when enabled"
            )));
        }
        if provider.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "providers.{vendor}.timeout_ms must be positive"
            )));
        }
        provider.to_settings(vendor)?;
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.to_metrics_config().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_address '{}' is not a socket address",
            metrics.listen_address
        )));
    }

    Ok(())
}
