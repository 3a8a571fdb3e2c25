//! Payment Callback Use Case
//!
//! Handles an asynchronous payment notification pushed by a clearing
//! provider. The payload is authenticated with the venue's credentials
//! before anything in it is acted upon; a verified notification triggers a
//! reconciliation of the referenced order.

use std::sync::Arc;

use super::reconcile_order::{ReconcileError, ReconcileOrderUseCase};
use crate::application::ports::{
    CallbackPayload, IntegrationRepository, OrderRepository, ProviderError, ProviderLookup,
    RepositoryError,
};
use crate::domain::integration::ClearingProviderId;
use crate::domain::ordering::OrderState;
use crate::domain::shared::OrderId;

/// Result of a handled callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Order the notification referred to.
    pub order_id: OrderId,
    /// Persisted state after reconciliation.
    pub state: OrderState,
}

/// Callback handling failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// Order, integration or provider does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// The notification failed authentication.
    #[error("Callback signature rejected: {message}")]
    SignatureVerification {
        /// Error details.
        message: String,
    },

    /// The notification could not be interpreted or does not match the
    /// venue's wiring.
    #[error("Invalid callback: {0}")]
    Provider(ProviderError),

    /// Reconciliation after a verified notification failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ProviderError> for CallbackError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { what } => Self::NotFound { what },
            ProviderError::SignatureVerification { message } => {
                Self::SignatureVerification { message }
            }
            other => Self::Provider(other),
        }
    }
}

/// Use case for inbound payment notifications.
pub struct PaymentCallbackUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    orders: Arc<O>,
    integrations: Arc<I>,
    providers: Arc<P>,
    reconcile: Arc<ReconcileOrderUseCase<O, I, P>>,
}

impl<O, I, P> PaymentCallbackUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Create a new `PaymentCallbackUseCase`.
    pub fn new(
        orders: Arc<O>,
        integrations: Arc<I>,
        providers: Arc<P>,
        reconcile: Arc<ReconcileOrderUseCase<O, I, P>>,
    ) -> Self {
        Self {
            orders,
            integrations,
            providers,
            reconcile,
        }
    }

    /// Authenticate a notification and reconcile the order it refers to.
    ///
    /// # Errors
    ///
    /// `SignatureVerification` if the payload fails authentication; nothing
    /// is reconciled in that case.
    pub async fn handle(
        &self,
        provider_id: ClearingProviderId,
        payload: &CallbackPayload,
    ) -> Result<CallbackOutcome, CallbackError> {
        let provider = self.providers.clearing(provider_id)?;
        let order_id = provider.callback_order_id(payload)?;

        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| CallbackError::NotFound {
                what: format!("order {order_id}"),
            })?;
        let integration = self
            .integrations
            .clearing_integration(&order.venue_id)
            .await?
            .ok_or_else(|| CallbackError::NotFound {
                what: format!("clearing integration for venue {}", order.venue_id),
            })?;

        if integration.provider != provider_id {
            tracing::warn!(
                order_id = %order_id,
                route_provider = %provider_id,
                venue_provider = %integration.provider,
                "Callback arrived through another provider's route"
            );
            return Err(CallbackError::Provider(ProviderError::ProviderMismatch {
                expected: provider_id.to_string(),
                actual: integration.provider.to_string(),
            }));
        }

        if let Err(err) = provider.verify_callback(&integration, payload) {
            tracing::warn!(
                order_id = %order_id,
                provider = %provider_id,
                error = %err,
                "Rejected payment callback"
            );
            return Err(err.into());
        }

        tracing::info!(order_id = %order_id, provider = %provider_id, "Payment callback verified");
        let state = self.reconcile.execute(&order_id).await?;

        Ok(CallbackOutcome { order_id, state })
    }
}
