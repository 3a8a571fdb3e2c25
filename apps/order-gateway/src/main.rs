//! Order Gateway Binary
//!
//! Starts the order reconciliation HTTP service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-gateway -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_GATEWAY_CONFIG`: Path to the YAML config (default: config.yaml,
//!   overridden by the first argument)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//!
//! Any `${VAR}` or `${VAR:-default}` reference inside the config file is
//! resolved from the environment at load time.
//!
//! # Storage
//!
//! Orders and venue integrations belong to an external storage service. The
//! binary runs on in-memory repositories, empty unless
//! `persistence.seed_file` points at a seed YAML (see `fixtures/seed.yaml`).

use std::sync::Arc;

use anyhow::Context;
use order_gateway::config::{Config, load_config};
use order_gateway::infrastructure::http::{AppState, ShutdownOutcome, create_router, serve};
use order_gateway::infrastructure::http_client::HttpClient;
use order_gateway::infrastructure::persistence::{
    InMemoryIntegrationRepository, InMemoryOrderRepository, SeedData,
};
use order_gateway::infrastructure::providers::ProviderRegistry;
use order_gateway::observability::{init_logging, init_metrics};
use tokio::net::TcpListener;
use tokio::signal;

/// Default config path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config_path();
    let config = load_config(Some(&config_path))
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    init_logging(&config.observability.logging)?;
    init_observability(&config);

    tracing::info!(config = %config_path, "Starting Order Gateway");

    let state = build_state(&config)?;
    let app = create_router(state);

    let addr = config.server.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  POST /api/v1/orders/{{order_id}}/reconcile");
    tracing::info!("  GET  /api/v1/orders/{{order_id}}/clearing-link");
    tracing::info!("  GET  /api/v1/venues/{{venue_id}}/menu");
    tracing::info!("  POST /api/v1/callbacks/{{provider}}");

    let outcome = serve(
        listener,
        app,
        shutdown_signal(),
        config.server.shutdown_timeout(),
    )
    .await
    .context("HTTP server error")?;

    match outcome {
        ShutdownOutcome::Drained => tracing::info!("Order Gateway stopped"),
        ShutdownOutcome::TimedOut => {
            tracing::warn!("Order Gateway stopped with requests still in flight");
        }
    }
    Ok(())
}

/// Config path: first argument, then `ORDER_GATEWAY_CONFIG`, then the default.
fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ORDER_GATEWAY_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Start the Prometheus exporter when enabled.
fn init_observability(config: &Config) {
    let metrics = &config.observability.metrics;
    if !metrics.enabled {
        return;
    }
    match metrics.to_metrics_config() {
        Some(metrics_config) => {
            if let Err(e) = init_metrics(&metrics_config) {
                tracing::warn!(error = %e, "Failed to start metrics exporter, continuing without it");
            }
        }
        None => {
            tracing::warn!(address = %metrics.listen_address, "Invalid metrics address");
        }
    }
}

/// Wire providers, breakers, repositories and use cases.
///
/// The repositories are in-memory stand-ins for external storage, loaded from
/// the configured seed file if there is one.
fn build_state(
    config: &Config,
) -> anyhow::Result<
    AppState<InMemoryOrderRepository, InMemoryIntegrationRepository, ProviderRegistry>,
> {
    let http = HttpClient::new(&config.http_client.to_client_config())
        .context("failed to build HTTP client")?;
    let breakers = Arc::new(config.circuit_breakers.to_registry());
    let providers = ProviderRegistry::from_config(&config.providers, &http, &breakers)?;

    tracing::info!(
        clearing = ?providers.clearing_ids(),
        management = ?providers.management_ids(),
        "Providers registered"
    );

    let orders = Arc::new(InMemoryOrderRepository::new());
    let integrations = Arc::new(InMemoryIntegrationRepository::new());
    match config.persistence.seed_path() {
        Some(path) => SeedData::load(path)
            .with_context(|| format!("failed to load seed data from {path}"))?
            .apply(&orders, &integrations),
        None => tracing::warn!("No seed file configured, starting with empty repositories"),
    }

    Ok(AppState::new(
        orders,
        integrations,
        Arc::new(providers),
        breakers,
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed; the process could not
/// respond to termination otherwise.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
