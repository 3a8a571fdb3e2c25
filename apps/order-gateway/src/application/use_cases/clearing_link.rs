//! Clearing Link Use Case
//!
//! Builds the hosted payment page a customer is redirected to at checkout.

use std::sync::Arc;

use url::Url;

use super::query_error::QueryError;
use crate::application::ports::{IntegrationRepository, OrderRepository, ProviderLookup};
use crate::domain::ordering::OrderState;
use crate::domain::shared::OrderId;

/// Use case for obtaining an order's payment page.
pub struct ClearingLinkUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    orders: Arc<O>,
    integrations: Arc<I>,
    providers: Arc<P>,
}

impl<O, I, P> ClearingLinkUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Create a new `ClearingLinkUseCase`.
    pub fn new(orders: Arc<O>, integrations: Arc<I>, providers: Arc<P>) -> Self {
        Self {
            orders,
            integrations,
            providers,
        }
    }

    /// Payment page for an unpaid order.
    ///
    /// # Errors
    ///
    /// `InvalidState` once the order has left `Init`.
    pub async fn execute(&self, order_id: &OrderId) -> Result<Url, QueryError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| QueryError::NotFound {
                what: format!("order {order_id}"),
            })?;

        if order.state != OrderState::Init {
            return Err(QueryError::InvalidState {
                order_id: order.id,
                state: order.state,
            });
        }

        let integration = self
            .integrations
            .clearing_integration(&order.venue_id)
            .await?
            .ok_or_else(|| QueryError::NotFound {
                what: format!("clearing integration for venue {}", order.venue_id),
            })?;

        let provider = self.providers.clearing_for(&integration)?;
        let url = provider
            .get_clearing_page_link(&integration, &order)
            .await?;

        tracing::debug!(order_id = %order_id, provider = %integration.provider, "Clearing page created");
        Ok(url)
    }
}
