//! Provider Lookup Port (Driven Port)
//!
//! Resolves a provider identifier, or a venue integration, to the provider
//! implementation that serves it.

use std::sync::Arc;

use super::clearing_provider_port::ClearingProvider;
use super::management_provider_port::ManagementProvider;
use super::provider_error::ProviderError;
use crate::domain::integration::{
    ClearingIntegration, ClearingProviderId, ManagementIntegration, ManagementProviderId,
};

/// Runtime lookup of provider implementations.
pub trait ProviderLookup: Send + Sync {
    /// Clearing implementation for `id`, or `NotFound` if none is registered.
    fn clearing(&self, id: ClearingProviderId) -> Result<Arc<dyn ClearingProvider>, ProviderError>;

    /// Management implementation for `id`, or `NotFound` if none is registered.
    fn management(
        &self,
        id: ManagementProviderId,
    ) -> Result<Arc<dyn ManagementProvider>, ProviderError>;

    /// Provider serving a venue's clearing integration.
    fn clearing_for(
        &self,
        integration: &ClearingIntegration,
    ) -> Result<Arc<dyn ClearingProvider>, ProviderError> {
        self.clearing(integration.provider)
    }

    /// Provider serving a venue's point-of-sale integration.
    fn management_for(
        &self,
        integration: &ManagementIntegration,
    ) -> Result<Arc<dyn ManagementProvider>, ProviderError> {
        self.management(integration.provider)
    }
}
