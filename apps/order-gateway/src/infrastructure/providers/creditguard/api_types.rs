//! CreditGuard gateway wire types.
//!
//! Requests are an `<ashrait>` document posted in the `int_in` form field of
//! the relay endpoint; responses come back as an `<ashrait>` document in the
//! body.

use serde::{Deserialize, Serialize};

/// Gateway protocol version.
pub const PROTOCOL_VERSION: &str = "2000";

/// Venue credentials stored on the clearing integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreditGuardCredentials {
    /// Relay user.
    pub user: String,
    /// Relay password.
    pub password: String,
    /// Terminal the venue clears through.
    pub terminal_number: String,
    /// Merchant id of the hosted payment page.
    pub mid: String,
}

/// Request envelope.
#[derive(Debug, Serialize)]
#[serde(rename = "ashrait")]
pub struct AshraitRequest<'a> {
    pub request: GatewayRequest<'a>,
}

/// One gateway command.
#[derive(Debug, Serialize)]
pub struct GatewayRequest<'a> {
    pub version: &'static str,
    pub language: &'static str,
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub command: &'static str,
    #[serde(rename = "doDeal", skip_serializing_if = "Option::is_none")]
    pub do_deal: Option<DoDealRequest<'a>>,
    #[serde(rename = "inquireTransactions", skip_serializing_if = "Option::is_none")]
    pub inquire_transactions: Option<InquireTransactionsRequest<'a>>,
}

/// Hosted payment page setup.
#[derive(Debug, Serialize)]
pub struct DoDealRequest<'a> {
    #[serde(rename = "terminalNumber")]
    pub terminal_number: &'a str,
    #[serde(rename = "cardNo")]
    pub card_no: &'static str,
    /// Amount in minor units.
    pub total: i64,
    #[serde(rename = "transactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "creditType")]
    pub credit_type: &'static str,
    pub currency: &'static str,
    #[serde(rename = "transactionCode")]
    pub transaction_code: &'static str,
    pub validation: &'static str,
    pub mid: &'a str,
    pub uniqueid: &'a str,
    #[serde(rename = "mpiValidation")]
    pub mpi_validation: &'static str,
    #[serde(rename = "successUrl", skip_serializing_if = "Option::is_none")]
    pub success_url: Option<&'a str>,
}

/// Transaction lookup by the merchant's unique id.
#[derive(Debug, Serialize)]
pub struct InquireTransactionsRequest<'a> {
    #[serde(rename = "terminalNumber")]
    pub terminal_number: &'a str,
    #[serde(rename = "queryName")]
    pub query_name: &'static str,
    pub mid: &'a str,
    pub uniqueid: &'a str,
}

/// Response envelope.
#[derive(Debug, Deserialize)]
pub struct AshraitResponse {
    pub response: GatewayResponse,
}

/// Result of one gateway command.
#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    pub command: String,
    pub result: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "doDeal")]
    pub do_deal: Option<DoDealResponse>,
    #[serde(rename = "inquireTransactions")]
    pub inquire_transactions: Option<InquireTransactionsResponse>,
}

/// Hosted payment page created.
#[derive(Debug, Deserialize)]
pub struct DoDealResponse {
    #[serde(rename = "mpiHostedPageUrl")]
    pub hosted_page_url: Option<String>,
}

/// Transactions matching an inquiry.
#[derive(Debug, Deserialize)]
pub struct InquireTransactionsResponse {
    #[serde(default, rename = "row")]
    pub rows: Vec<TransactionRow>,
}

/// One transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionRow {
    #[serde(default)]
    pub uniqueid: String,
    #[serde(rename = "statusCode")]
    pub status_code: String,
    #[serde(rename = "cgUid")]
    pub cg_uid: Option<String>,
    pub total: Option<i64>,
}
