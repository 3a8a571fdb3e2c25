//! HTTP client error types.

use thiserror::Error;

use crate::application::ports::ProviderError;

/// Errors from the HTTP client facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Transport failure: DNS, connect, TLS, reset or timeout.
    #[error("Request failed: {message}")]
    Request {
        /// Error details.
        message: String,
        /// Whether the call hit its deadline.
        timed_out: bool,
    },

    /// Upstream answered with a retryable status (5xx, 408, 429).
    #[error("Server error (HTTP {status}): {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Upstream answered with any other non-success status.
    #[error("Client error (HTTP {status}): {body}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body could not be read as requested.
    #[error("Content error: {message}")]
    Content {
        /// Error details.
        message: String,
    },
}

impl HttpError {
    /// Create a content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request { message, .. } => Self::Request { message },
            HttpError::Server { status, body } => Self::Server { status, body },
            HttpError::Client { status, body } => Self::Client { status, body },
            HttpError::Content { message } => Self::Content { message },
        }
    }
}
