//! Venue Menu Use Case

use std::sync::Arc;

use super::query_error::QueryError;
use crate::application::ports::{IntegrationRepository, ProviderLookup};
use crate::domain::menu::Menu;
use crate::domain::shared::VenueId;

/// Use case for reading a venue's menu from its POS.
pub struct VenueMenuUseCase<I, P>
where
    I: IntegrationRepository,
    P: ProviderLookup,
{
    integrations: Arc<I>,
    providers: Arc<P>,
}

impl<I, P> VenueMenuUseCase<I, P>
where
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Create a new `VenueMenuUseCase`.
    pub fn new(integrations: Arc<I>, providers: Arc<P>) -> Self {
        Self {
            integrations,
            providers,
        }
    }

    /// Current menu of `venue_id`.
    pub async fn execute(&self, venue_id: &VenueId) -> Result<Menu, QueryError> {
        let integration = self
            .integrations
            .management_integration(venue_id)
            .await?
            .ok_or_else(|| QueryError::NotFound {
                what: format!("management integration for venue {venue_id}"),
            })?;

        let provider = self.providers.management_for(&integration)?;
        Ok(provider.get_venue_menu(&integration).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{Fixture, VENUE_ID};
    use crate::domain::ordering::OrderState;

    #[tokio::test]
    async fn menu_is_read_through_the_venue_pos() {
        let fixture = Fixture::with_order_in(OrderState::Init);
        let use_case = VenueMenuUseCase::new(
            Arc::clone(&fixture.integrations),
            Arc::clone(&fixture.providers),
        );

        let menu = use_case.execute(&VenueId::new(VENUE_ID)).await.unwrap();
        assert_eq!(menu.item_count(), 0);

        let err = use_case
            .execute(&VenueId::new("unknown"))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::NotFound { .. }));
    }
}
