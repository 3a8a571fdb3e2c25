//! Clearing Provider Port (Driven Port)
//!
//! Interface for payment-clearing vendors: hosted payment pages, payment
//! confirmation and asynchronous payment notifications.

use async_trait::async_trait;
use url::Url;

use super::provider_error::ProviderError;
use crate::domain::integration::{ClearingIntegration, ClearingProviderId};
use crate::domain::ordering::Order;
use crate::domain::shared::{OrderId, TransactionId};

/// Asynchronous payment notification, as received.
///
/// Nothing in here is trusted until [`ClearingProvider::verify_callback`]
/// has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackPayload {
    /// Raw request body, byte for byte.
    pub body: Vec<u8>,
    /// Signature header sent alongside the body, if any.
    pub signature: Option<String>,
}

impl CallbackPayload {
    /// Create a payload from a body and optional signature.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>, signature: Option<String>) -> Self {
        Self {
            body: body.into(),
            signature,
        }
    }
}

/// Port for payment-clearing vendors.
#[async_trait]
pub trait ClearingProvider: Send + Sync {
    /// Vendor implemented by this provider.
    fn id(&self) -> ClearingProviderId;

    /// Build a hosted payment page for the order.
    async fn get_clearing_page_link(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<Url, ProviderError>;

    /// Confirm the order was paid for and return the clearing transaction.
    async fn validate_transaction(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<TransactionId, ProviderError>;

    /// Extract the order reference from a notification. The result is
    /// untrusted until the payload has been verified.
    fn callback_order_id(&self, payload: &CallbackPayload) -> Result<OrderId, ProviderError> {
        let _ = payload;
        Err(ProviderError::Unsupported {
            provider: self.id().to_string(),
            operation: "callback_order_id".to_string(),
        })
    }

    /// Verify a notification's authenticity with the venue's credentials.
    fn verify_callback(
        &self,
        integration: &ClearingIntegration,
        payload: &CallbackPayload,
    ) -> Result<(), ProviderError> {
        let _ = (integration, payload);
        Err(ProviderError::Unsupported {
            provider: self.id().to_string(),
            operation: "verify_callback".to_string(),
        })
    }
}

/// Fail fast unless `integration` is wired to `provider`.
pub fn ensure_clearing_provider(
    provider: ClearingProviderId,
    integration: &ClearingIntegration,
) -> Result<(), ProviderError> {
    if integration.provider == provider {
        Ok(())
    } else {
        Err(ProviderError::ProviderMismatch {
            expected: provider.to_string(),
            actual: integration.provider.to_string(),
        })
    }
}
