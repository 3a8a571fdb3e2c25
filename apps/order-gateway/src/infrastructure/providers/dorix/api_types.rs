//! Dorix POS wire types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Venue credentials stored on the management integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DorixCredentials {
    /// Bearer token issued per venue.
    pub api_token: String,
    /// Branch the venue's kitchen runs under.
    pub branch_id: String,
}

/// `POST v1/order`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest<'a> {
    pub branch_id: &'a str,
    pub external_id: &'a str,
    pub payment: Payment<'a>,
    pub customer: Customer<'a>,
    pub items: Vec<Item<'a>>,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment<'a> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct Customer<'a> {
    pub name: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item<'a> {
    pub item_id: &'a str,
    pub name: &'a str,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct OrderAck {
    pub ack: bool,
    #[serde(default)]
    pub message: String,
}

/// `GET v1/order/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct OrderStatusResponse {
    pub status: String,
}

/// `GET v1/menu/{branch}`.
#[derive(Debug, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
}

#[derive(Debug, Deserialize)]
pub struct MenuCategory {
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}
