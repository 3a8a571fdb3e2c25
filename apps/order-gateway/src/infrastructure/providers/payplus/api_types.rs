//! PayPlus REST wire types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Venue credentials stored on the clearing integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayPlusCredentials {
    /// API key.
    pub api_key: String,
    /// Secret key, also the HMAC key for the `hash` header.
    pub secret_key: String,
    /// Payment page the venue charges through.
    pub payment_page_uid: String,
}

/// `Authorization` header value: the credentials as a JSON object.
#[derive(Debug, Serialize)]
pub struct AuthorizationHeader<'a> {
    pub api_key: &'a str,
    pub secret_key: &'a str,
}

/// `POST PaymentPages/generateLink`.
#[derive(Debug, Serialize)]
pub struct GenerateLinkRequest<'a> {
    pub payment_page_uid: &'a str,
    pub amount: serde_json::Number,
    pub currency_code: &'static str,
    /// Carries the order id; echoed back on the transaction.
    pub more_info: &'a str,
    #[serde(rename = "refURL_callback", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    pub customer: Customer<'a>,
    pub items: Vec<Item<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Customer<'a> {
    pub customer_name: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Item<'a> {
    pub name: &'a str,
    pub quantity: u32,
    pub price: serde_json::Number,
}

/// `POST PaymentPages/ipn`.
#[derive(Debug, Serialize)]
pub struct IpnRequest<'a> {
    pub payment_page_uid: &'a str,
    pub more_info: &'a str,
}

/// Every PayPlus response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub results: ApiResults,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResults {
    pub status: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub description: String,
}

impl ApiResults {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    pub fn code(&self) -> String {
        self.code.map_or_else(|| self.status.clone(), |c| c.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateLinkData {
    #[serde(default)]
    pub page_request_uid: Option<String>,
    pub payment_page_link: String,
}

#[derive(Debug, Deserialize)]
pub struct IpnData {
    #[serde(default)]
    pub transaction_uid: Option<String>,
    pub status_code: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub more_info: Option<String>,
}

/// Body of an asynchronous payment notification.
#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    pub transaction: CallbackTransaction,
}

#[derive(Debug, Deserialize)]
pub struct CallbackTransaction {
    pub more_info: String,
}
