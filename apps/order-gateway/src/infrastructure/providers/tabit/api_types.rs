//! Tabit POS wire types. Amounts are integer minor units.

use serde::{Deserialize, Serialize};

/// Venue credentials stored on the management integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabitCredentials {
    /// Integration API key.
    pub api_key: String,
    /// Organization the venue belongs to.
    pub organization_id: String,
    /// Site (physical venue) id.
    pub site_id: String,
}

/// `POST orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest<'a> {
    pub site_id: &'a str,
    pub external_order_id: &'a str,
    pub order_type: &'static str,
    pub customer: Customer<'a>,
    pub items: Vec<OrderedItem<'a>>,
    pub payments: Vec<Payment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer<'a> {
    pub full_name: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedItem<'a> {
    pub offer_id: &'a str,
    pub name: &'a str,
    pub quantity: u32,
    pub price: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment<'a> {
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub order_id: Option<String>,
}

/// `GET orders?externalOrderId=`: orders carrying our id.
#[derive(Debug, Deserialize)]
pub struct OrderSearchResponse {
    #[serde(default)]
    pub orders: Vec<OrderSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(default)]
    pub order_id: Option<String>,
    pub order_state: String,
}

/// `GET menus/items`: a flat item list tagged with category names.
#[derive(Debug, Deserialize)]
pub struct MenuItemsResponse {
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_name: String,
    pub price: i64,
}
