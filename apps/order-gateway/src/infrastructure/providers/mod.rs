//! Concrete clearing and point-of-sale providers.
//!
//! Every vendor adapter talks HTTP through a [`ProviderEndpoint`], which puts
//! the vendor's circuit breaker in front of the shared client.

pub mod creditguard;
pub mod dorix;
mod endpoint;
pub mod payplus;
mod registry;
pub mod tabit;

pub use creditguard::CreditGuardProvider;
pub use dorix::DorixProvider;
pub use endpoint::{ProviderEndpoint, ProviderSettings};
pub use payplus::PayPlusProvider;
pub use registry::ProviderRegistry;
pub use tabit::TabitProvider;
