//! Dorix POS adapter implementing `ManagementProvider`.

use async_trait::async_trait;

use crate::application::ports::{ManagementProvider, ProviderError, ensure_management_provider};
use crate::domain::integration::{ManagementIntegration, ManagementProviderId};
use crate::domain::menu::{Menu, MenuCategory, MenuItem};
use crate::domain::ordering::{Order, OrderState};
use crate::domain::shared::{MenuItemId, Money};
use crate::infrastructure::http_client::RequestOptions;
use crate::infrastructure::providers::endpoint::ProviderEndpoint;

use super::api_types::{
    Customer, DorixCredentials, Item, MenuResponse, OrderAck, OrderRequest, OrderStatusResponse,
    Payment,
};

/// Dorix REST adapter.
#[derive(Debug, Clone)]
pub struct DorixProvider {
    endpoint: ProviderEndpoint,
}

impl DorixProvider {
    /// Create a new Dorix adapter.
    #[must_use]
    pub const fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    fn credentials(integration: &ManagementIntegration) -> Result<DorixCredentials, ProviderError> {
        ensure_management_provider(ManagementProviderId::Dorix, integration)?;
        integration
            .credentials()
            .map_err(|e| ProviderError::InvalidCredentials {
                message: format!("dorix: {e}"),
            })
    }
}

/// Map a Dorix order status onto the order lifecycle.
pub fn map_status(status: &str) -> Result<OrderState, ProviderError> {
    match status.trim().to_ascii_uppercase().as_str() {
        "AWAITING_CONFIRMATION" => Ok(OrderState::Unconfirmed),
        "ACCEPTED" | "IN_PREPARATION" | "READY" => Ok(OrderState::Confirmed),
        "DELIVERED" => Ok(OrderState::Delivered),
        "DECLINED" | "CANCELED" => Ok(OrderState::Cancelled),
        other => Err(ProviderError::content(format!("unknown dorix order status '{other}'"))),
    }
}

#[async_trait]
impl ManagementProvider for DorixProvider {
    fn id(&self) -> ManagementProviderId {
        ManagementProviderId::Dorix
    }

    async fn report_order(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<(), ProviderError> {
        let credentials = Self::credentials(integration)?;
        let request = OrderRequest {
            branch_id: &credentials.branch_id,
            external_id: order.id.as_str(),
            payment: Payment {
                status: "PAID",
                transaction_id: order.tx_id.as_ref().map(|tx| tx.as_str()),
            },
            customer: Customer {
                name: &order.customer.name,
                phone: &order.customer.phone,
            },
            items: order
                .items
                .iter()
                .map(|item| Item {
                    item_id: item.menu_item_id.as_str(),
                    name: &item.name,
                    quantity: item.quantity,
                    price: item.unit_price.amount(),
                })
                .collect(),
            total: order.total_cost.amount(),
        };

        let response = self
            .endpoint
            .send(
                "report_order",
                self.endpoint.url("v1/order")?,
                RequestOptions::post()
                    .bearer(&credentials.api_token)
                    .json(serde_json::to_value(&request)?),
            )
            .await?;

        let ack: OrderAck = response.json()?;
        if !ack.ack {
            return Err(ProviderError::Rejected {
                code: "NACK".to_string(),
                message: ack.message,
            });
        }

        tracing::info!(order_id = %order.id, branch_id = %credentials.branch_id, "Order reported to Dorix");
        Ok(())
    }

    async fn get_order_status(
        &self,
        integration: &ManagementIntegration,
        order: &Order,
    ) -> Result<OrderState, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let mut url = self
            .endpoint
            .url_with_segments(&["v1", "order", order.id.as_str(), "status"])?;
        url.query_pairs_mut()
            .append_pair("branchId", &credentials.branch_id);

        let response = self
            .endpoint
            .send(
                "get_order_status",
                url,
                RequestOptions::get().bearer(&credentials.api_token),
            )
            .await?;

        let status: OrderStatusResponse = response.json()?;
        map_status(&status.status)
    }

    async fn get_venue_menu(
        &self,
        integration: &ManagementIntegration,
    ) -> Result<Menu, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let response = self
            .endpoint
            .send(
                "get_venue_menu",
                self
                    .endpoint
                    .url_with_segments(&["v1", "menu", &credentials.branch_id])?,
                RequestOptions::get().bearer(&credentials.api_token),
            )
            .await?;

        let menu: MenuResponse = response.json()?;
        Ok(Menu {
            categories: menu
                .categories
                .into_iter()
                .map(|category| MenuCategory {
                    name: category.name,
                    items: category
                        .items
                        .into_iter()
                        .map(|item| MenuItem {
                            id: MenuItemId::new(item.id),
                            name: item.name,
                            description: item.description,
                            price: Money::new(item.price),
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}
