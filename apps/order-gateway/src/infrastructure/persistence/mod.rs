//! Persistence Adapters
//!
//! Implementations of the repository ports. Durable storage is owned by an
//! external collaborator; the in-memory adapters back development and tests,
//! optionally pre-loaded from a seed file.

pub mod in_memory;
mod seed;

pub use in_memory::{InMemoryIntegrationRepository, InMemoryOrderRepository};
pub use seed::{SeedData, SeedError};
