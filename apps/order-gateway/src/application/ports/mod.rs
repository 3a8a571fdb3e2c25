//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! Providers and repositories are implemented in the infrastructure layer.

mod clearing_provider_port;
mod integration_repository_port;
mod management_provider_port;
mod order_repository_port;
mod provider_error;
mod provider_lookup_port;

pub use clearing_provider_port::{CallbackPayload, ClearingProvider, ensure_clearing_provider};
pub use integration_repository_port::IntegrationRepository;
pub use management_provider_port::{ManagementProvider, ensure_management_provider};
pub use order_repository_port::{OrderRepository, RepositoryError};
pub use provider_error::ProviderError;
pub use provider_lookup_port::ProviderLookup;
