// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Gateway - Rust Core Library
//!
//! Resilience and reconciliation layer between online restaurant orders and
//! the payment-clearing and point-of-sale providers each venue is wired to.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `ordering`: Order aggregate and its lifecycle state
//!   - `integration`: Venue-scoped provider wiring and credentials
//!   - `menu`: Venue menus
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `ClearingProvider`, `ManagementProvider`, repositories, `ProviderLookup`
//!   - `use_cases`: `ReconcileOrder`, `PaymentCallback`, `ClearingLink`, `VenueMenu`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `providers`: CreditGuard, PayPlus, Dorix and Tabit adapters
//!   - `http_client`: Outbound HTTP with error classification
//!   - `http`: Inbound REST API and callbacks
//!   - `persistence`: In-memory repositories
//!
//! - **Resilience**: Circuit breakers shared by identity
//!
//! Every outbound provider call passes through a [`resilience::CircuitBreaker`];
//! an open breaker fails fast without touching the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration with environment interpolation.
pub mod config;

/// Structured logging and Prometheus metrics.
pub mod observability;

/// Circuit breakers for outbound provider calls.
pub mod resilience;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::integration::{
    ClearingIntegration, ClearingProviderId, ManagementIntegration, ManagementProviderId,
};
pub use domain::menu::{Menu, MenuCategory, MenuItem};
pub use domain::ordering::{Customer, Order, OrderItem, OrderState};
pub use domain::shared::{MenuItemId, Money, OrderId, TransactionId, VenueId};

// Application re-exports
pub use application::ports::{
    ClearingProvider, IntegrationRepository, ManagementProvider, OrderRepository, ProviderError,
    ProviderLookup, RepositoryError,
};
pub use application::use_cases::{
    CallbackError, ClearingLinkUseCase, PaymentCallbackUseCase, QueryError, ReconcileError,
    ReconcileOrderUseCase, VenueMenuUseCase,
};

// Infrastructure re-exports
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::{InMemoryIntegrationRepository, InMemoryOrderRepository};
pub use infrastructure::providers::ProviderRegistry;

// Resilience re-exports
pub use resilience::{BreakerConfig, BreakerRegistry, BreakerState, CircuitBreaker};
