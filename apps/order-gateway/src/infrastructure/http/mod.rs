//! HTTP/REST API adapter.
//!
//! Inbound adapter implementing REST endpoints that delegate to application use cases.

mod controller;
mod response;
mod server;

pub use controller::{AppState, CALLBACK_SIGNATURE_HEADER, create_router};
pub use response::*;
pub use server::{ShutdownOutcome, serve};
