//! HTTP client facade for outbound provider calls.
//!
//! One shared [`HttpClient`] performs every provider request and maps the
//! outcome onto [`HttpError`], which converts into the provider error
//! taxonomy before the circuit breaker sees it.

mod client;
mod error;
mod response;

pub use client::{HttpClient, HttpClientConfig, RequestBody, RequestOptions};
pub use error::HttpError;
pub use response::HttpResponse;
