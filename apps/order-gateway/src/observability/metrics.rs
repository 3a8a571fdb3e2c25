//! Prometheus metrics for the order gateway.
//!
//! Provides metrics for provider calls, circuit breakers and order
//! reconciliation stages.
//!
//! # Example
//!
//! ```ignore
//! use order_gateway::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("Failed to initialize metrics");
//!
//! // Record a provider call
//! record_provider_request("payplus", "validate_transaction", "ok", 0.120);
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for provider latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // Third-party APIs: 10ms to 30s
            latency_buckets: vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Provider Metrics
// ============================================================================

/// Record an outbound provider call.
///
/// # Arguments
///
/// * `provider` - Provider name (e.g., "payplus", "dorix")
/// * `operation` - Capability invoked (e.g., "report_order")
/// * `outcome` - "ok" or the error class
/// * `latency_seconds` - Wall time of the call in seconds
pub fn record_provider_request(
    provider: &str,
    operation: &str,
    outcome: &str,
    latency_seconds: f64,
) {
    counter!(
        "provider_requests_total",
        "provider" => provider.to_string(),
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "provider_request_duration_seconds",
        "provider" => provider.to_string(),
        "operation" => operation.to_string()
    )
    .record(latency_seconds);
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Record the outcome of one reconciliation stage.
pub fn record_reconcile_stage(stage: &str, outcome: &str) {
    counter!(
        "reconcile_stage_total",
        "stage" => stage.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Circuit Breaker Metrics
// ============================================================================

/// Circuit breaker state values for the gauge.
pub mod circuit_breaker_state {
    /// Circuit is closed (healthy).
    pub const CLOSED: f64 = 0.0;
    /// Circuit is open (failing).
    pub const OPEN: f64 = 1.0;
    /// Circuit is half-open (probing).
    pub const HALF_OPEN: f64 = 2.0;
}

/// Update circuit breaker state gauge.
///
/// # Arguments
///
/// * `breaker` - Breaker identity (e.g., "payplus")
/// * `state` - Numeric state (0=closed, 1=open, 2=`half_open`)
pub fn record_circuit_breaker_state(breaker: &str, state: f64) {
    gauge!(
        "circuit_breaker_state",
        "breaker" => breaker.to_string()
    )
    .set(state);
}

/// Record a failure counted by a circuit breaker.
pub fn record_circuit_breaker_failure(breaker: &str) {
    counter!(
        "circuit_breaker_failures_total",
        "breaker" => breaker.to_string()
    )
    .increment(1);
}

/// Record a call rejected because the circuit is open.
pub fn record_circuit_breaker_rejected(breaker: &str) {
    counter!(
        "circuit_breaker_rejected_total",
        "breaker" => breaker.to_string()
    )
    .increment(1);
}
