//! Management Provider Port (Driven Port)
//!
//! Interface for the venue's point-of-sale (kitchen) system.

use async_trait::async_trait;

use super::provider_error::ProviderError;
use crate::domain::integration::{ManagementIntegration, ManagementProviderId};
use crate::domain::menu::Menu;
use crate::domain::ordering::{Order, OrderState};

/// Port for point-of-sale vendors.
#[async_trait]
pub trait ManagementProvider: Send + Sync {
    /// Vendor implemented by this provider.
    fn id(&self) -> ManagementProviderId;

    /// Submit a paid order to the kitchen.
    async fn report_order(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<(), ProviderError>;

    /// Current kitchen status of a reported order, mapped onto [`OrderState`].
    async fn get_order_status(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<OrderState, ProviderError>;

    /// The venue's current menu.
    async fn get_venue_menu(
        &self,
        integration: &ManagementIntegration,
    ) -> Result<Menu, ProviderError>;
}

/// Fail fast unless `integration` is wired to `provider`.
pub fn ensure_management_provider(
    provider: ManagementProviderId,
    integration: &ManagementIntegration,
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
