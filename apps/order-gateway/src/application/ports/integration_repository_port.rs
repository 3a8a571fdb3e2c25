//! Integration Repository Port (Driven Port)
//!
//! Read-only access to a venue's provider wiring.

use async_trait::async_trait;

use super::order_repository_port::RepositoryError;
use crate::domain::integration::{ClearingIntegration, ManagementIntegration};
use crate::domain::shared::VenueId;

/// Port for venue integration lookups.
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// The venue's clearing integration, if configured.
    async fn clearing_integration(
        &self,
        venue_id: &VenueId,
    ) -> Result<Option<ClearingIntegration>, RepositoryError>;

    /// The venue's point-of-sale integration, if configured.
    async fn management_integration(
        &self,
        venue_id: &VenueId,
    ) -> Result<Option<ManagementIntegration>, RepositoryError>;
}
