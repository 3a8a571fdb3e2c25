//! HTTP response DTOs and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::{CallbackError, QueryError, ReconcileError};
use crate::domain::ordering::OrderState;
use crate::resilience::BreakerSnapshot;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` while any breaker is open.
    pub status: String,
    /// Version.
    pub version: String,
    /// Every breaker created so far.
    pub breakers: Vec<BreakerSnapshot>,
}

/// An order's persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStateResponse {
    /// Order identifier.
    pub order_id: String,
    /// State after the request.
    pub state: OrderState,
}

/// Hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingLinkResponse {
    /// Where to redirect the customer.
    pub url: String,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Whether retrying shortly may succeed.
    pub retry: bool,
}

/// Error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                code: code.to_string(),
                message: message.into(),
                retry: false,
            },
        }
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 503 with `retry: true`.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNREACHABLE", message);
        err.body.retry = true;
        err
    }

    /// 500, logged for operators.
    pub fn internal(code: &str, message: impl Into<String>) -> Self {
        let err = Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message);
        tracing::error!(code = %err.body.code, error = %err.body.message, "Request failed");
        err
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::NotFound { .. } => Self::not_found(err.to_string()),
            ReconcileError::ProviderUnreachable { .. } => {
                tracing::warn!(error = %err, "Provider unreachable, retry shortly");
                Self::unavailable(format!("{err}; retry shortly"))
            }
            ReconcileError::Provider { .. } => Self::internal("PROVIDER_ERROR", err.to_string()),
            ReconcileError::Repository(_) => Self::internal("REPOSITORY_ERROR", err.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound { .. } => Self::not_found(err.to_string()),
            QueryError::InvalidState { .. } => {
                Self::new(StatusCode::CONFLICT, "INVALID_STATE", err.to_string())
            }
            QueryError::ProviderUnreachable(_) => Self::unavailable(format!("{err}; retry shortly")),
            QueryError::Provider(_) => Self::internal("PROVIDER_ERROR", err.to_string()),
            QueryError::Repository(_) => Self::internal("REPOSITORY_ERROR", err.to_string()),
        }
    }
}

impl From<CallbackError> for ApiError {
    fn from(err: CallbackError) -> Self {
        match err {
            CallbackError::NotFound { .. } => Self::not_found(err.to_string()),
            CallbackError::SignatureVerification { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, "SIGNATURE_REJECTED", err.to_string())
            }
            CallbackError::Reconcile(inner) => inner.into(),
            CallbackError::Provider(_) => Self::internal("INVALID_CALLBACK", err.to_string()),
            CallbackError::Repository(_) => Self::internal("REPOSITORY_ERROR", err.to_string()),
        }
    }
}
