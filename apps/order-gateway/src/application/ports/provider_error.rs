//! Provider error taxonomy shared by every clearing and management vendor.

use crate::resilience::{BreakerFailure, BreakerOpenError};

/// Error returned by a provider capability.
///
/// Only [`ProviderError::Request`] and [`ProviderError::Server`] mean the
/// upstream is unhealthy; every other variant proves it answered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure: connect, timeout, reset.
    #[error("Provider request failed: {message}")]
    Request {
        /// Error details.
        message: String,
    },

    /// Upstream answered 5xx.
    #[error("Provider server error (HTTP {status}): {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Upstream answered 4xx.
    #[error("Provider client error (HTTP {status}): {body}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Response body failed to decode or validate.
    #[error("Invalid provider response: {message}")]
    Content {
        /// What was wrong with the body.
        message: String,
    },

    /// Call rejected without being attempted because the breaker is open.
    #[error(transparent)]
    BreakerOpen(#[from] BreakerOpenError),

    /// The integration belongs to another provider than the one invoked.
    #[error("Provider mismatch: integration uses '{actual}', invoked '{expected}'")]
    ProviderMismatch {
        /// Provider that was invoked.
        expected: String,
        /// Provider the integration is wired to.
        actual: String,
    },

    /// Response or callback authenticity check failed.
    #[error("Signature verification failed: {message}")]
    SignatureVerification {
        /// Error details.
        message: String,
    },

    /// Referenced order, integration or provider does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// Vendor processed the call and returned a non-success business code.
    #[error("Rejected by provider (code {code}): {message}")]
    Rejected {
        /// Vendor result code.
        code: String,
        /// Vendor message.
        message: String,
    },

    /// Venue credentials could not be decoded for this provider.
    #[error("Invalid integration credentials: {message}")]
    InvalidCredentials {
        /// Error details.
        message: String,
    },

    /// Operation is not offered by this provider.
    #[error("Operation '{operation}' is not supported by provider '{provider}'")]
    Unsupported {
        /// Provider name.
        provider: String,
        /// Operation name.
        operation: String,
    },
}

impl ProviderError {
    /// Create a content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true if the provider could not be reached at all: the breaker
    /// short-circuited or the transport failed.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::BreakerOpen(_) | Self::Request { .. })
    }

    /// Short label for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Server { .. } => "server",
            Self::Client { .. } => "client",
            Self::Content { .. } => "content",
            Self::BreakerOpen(_) => "breaker_open",
            Self::ProviderMismatch { .. } => "provider_mismatch",
            Self::SignatureVerification { .. } => "signature",
            Self::NotFound { .. } => "not_found",
            Self::Rejected { .. } => "rejected",
            Self::InvalidCredentials { .. } => "invalid_credentials",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

impl BreakerFailure for ProviderError {
    fn counts_as_failure(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Server { .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::content(err.to_string())
    }
}
