//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `providers/`: Clearing and point-of-sale vendor adapters
//!   - `http_client/`: Outbound HTTP shared by every vendor
//!   - `persistence/`: Order and integration repositories (in-memory)
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: REST API controllers and payment callbacks

pub mod http;
pub mod http_client;
pub mod persistence;
pub mod providers;
