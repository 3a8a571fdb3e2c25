//! Tabit POS adapter implementing `ManagementProvider`.

use async_trait::async_trait;

use crate::application::ports::{ManagementProvider, ProviderError, ensure_management_provider};
use crate::domain::integration::{ManagementIntegration, ManagementProviderId};
use crate::domain::menu::{Menu, MenuCategory, MenuItem};
use crate::domain::ordering::{Order, OrderState};
use crate::domain::shared::{MenuItemId, Money};
use crate::infrastructure::http_client::RequestOptions;
use crate::infrastructure::providers::endpoint::ProviderEndpoint;

use super::api_types::{
    CreateOrderRequest, CreateOrderResponse, Customer, MenuItemsResponse, OrderSearchResponse,
    OrderedItem, Payment, TabitCredentials,
};

/// Tabit REST adapter.
#[derive(Debug, Clone)]
pub struct TabitProvider {
    endpoint: ProviderEndpoint,
}

impl TabitProvider {
    /// Create a new Tabit adapter.
    #[must_use]
    pub const fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    fn credentials(integration: &ManagementIntegration) -> Result<TabitCredentials, ProviderError> {
        ensure_management_provider(ManagementProviderId::Tabit, integration)?;
        integration
            .credentials()
            .map_err(|e| ProviderError::InvalidCredentials {
                message: format!("tabit: {e}"),
            })
    }

    fn authorized(options: RequestOptions, credentials: &TabitCredentials) -> RequestOptions {
        options
            .header("x-api-key", credentials.api_key.as_str())
            .header("x-organization-id", credentials.organization_id.as_str())
    }
}

/// Map a Tabit `orderState` onto the order lifecycle.
pub fn map_order_state(state: &str) -> Result<OrderState, ProviderError> {
    match state.trim().to_ascii_lowercase().as_str() {
        "new" => Ok(OrderState::Unconfirmed),
        "opened" | "sent" => Ok(OrderState::Confirmed),
        "served" | "closed" => Ok(OrderState::Delivered),
        "void" | "rejected" => Ok(OrderState::Cancelled),
        other => Err(ProviderError::content(format!("unknown tabit order state '{other}'"))),
    }
}

fn minor_units(money: Money) -> Result<i64, ProviderError> {
    money
        .to_minor_units()
        .ok_or_else(|| ProviderError::content(format!("amount {money} out of range")))
}

/// Group the flat item list by category, keeping first-seen category order.
fn group_menu(response: MenuItemsResponse) -> Menu {
    let mut categories: Vec<MenuCategory> = Vec::new();
    for item in response.items {
        let entry = MenuItem {
            id: MenuItemId::new(item.id),
            name: item.name,
            description: item.description,
            price: Money::from_minor_units(item.price),
        };
        match categories.iter_mut().find(|c| c.name == item.category_name) {
            Some(category) => category.items.push(entry),
            None => categories.push(MenuCategory {
                name: item.category_name,
                items: vec![entry],
            }),
        }
    }
    Menu { categories }
}

#[async_trait]
impl ManagementProvider for TabitProvider {
    fn id(&self) -> ManagementProviderId {
        ManagementProviderId::Tabit
    }

    async fn report_order(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<(), ProviderError> {
        let credentials = Self::credentials(integration)?;
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(OrderedItem {
                    offer_id: item.menu_item_id.as_str(),
                    name: &item.name,
                    quantity: item.quantity,
                    price: minor_units(item.unit_price)?,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let request = CreateOrderRequest {
            site_id: &credentials.site_id,
            external_order_id: order.id.as_str(),
            order_type: "takeaway",
            customer: Customer {
                full_name: &order.customer.name,
                phone: &order.customer.phone,
            },
            items,
            payments: vec![Payment {
                amount: minor_units(order.total_cost)?,
                reference: order.tx_id.as_ref().map(|tx| tx.as_str()),
            }],
        };

        let response = self
            .endpoint
            .send(
                "report_order",
                self.endpoint.url_with_segments(&["orders"])?,
                Self::authorized(RequestOptions::post(), &credentials)
                    .json(serde_json::to_value(&request)?),
            )
            .await?;

        let created: CreateOrderResponse = response.json()?;
        let tabit_id = created
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::content("order created without orderId"))?;

        // Tabit keys the order by `externalOrderId` too, which is what status
        // polls search on; its own id is only logged.
        tracing::info!(order_id = %order.id, tabit_order_id = %tabit_id, "Order reported to Tabit");
        Ok(())
    }

    async fn get_order_status(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<OrderState, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let mut url = self.endpoint.url_with_segments(&["orders"])?;
        url.query_pairs_mut()
            .append_pair("siteId", &credentials.site_id)
            .append_pair("externalOrderId", order.id.as_str());

        let response = self
            .endpoint
            .send(
                "get_order_status",
                url,
                Self::authorized(RequestOptions::get(), &credentials),
            )
            .await?;

        let body: OrderSearchResponse = response.json()?;
        let found = body.orders.into_iter().next().ok_or_else(|| {
            ProviderError::content(format!("no tabit order with external id {}", order.id))
        })?;
        tracing::debug!(
            order_id = %order.id,
            tabit_order_id = found.order_id.as_deref().unwrap_or_default(),
            state = %found.order_state,
            "Tabit order status"
        );
        map_order_state(&found.order_state)
    }

    async fn get_venue_menu(
        &self,
        integration: &ManagementIntegration,
    ) -> Result<Menu, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let mut url = self.endpoint.url_with_segments(&["menus", "items"])?;
        url.query_pairs_mut()
            .append_pair("siteId", &credentials.site_id);

        let response = self
            .endpoint
            .send(
                "get_venue_menu",
                url,
                Self::authorized(RequestOptions::get(), &credentials),
            )
            .await?;

        Ok(group_menu(response.json()?))
    }
}
