//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for providers and repositories
//! - **Use Cases**: Reconciliation, payment callbacks and provider-backed queries

pub mod ports;
pub mod use_cases;

pub use ports::*;
pub use use_cases::*;
