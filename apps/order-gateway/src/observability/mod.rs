//! Observability module for logging and metrics.
//!
//! Structured logging goes through `tracing`; this module installs the
//! subscriber and holds the Prometheus exporter and the metric recording
//! helpers.

mod logging;
mod metrics;

pub use logging::{LoggingError, env_filter, init_logging};
pub use metrics::{
    MetricsConfig, MetricsError, circuit_breaker_state, init_metrics,
    record_circuit_breaker_failure, record_circuit_breaker_rejected,
    record_circuit_breaker_state, record_provider_request, record_reconcile_stage,
};
