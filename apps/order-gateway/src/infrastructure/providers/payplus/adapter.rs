//! PayPlus clearing adapter implementing `ClearingProvider`.

use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::application::ports::{
    CallbackPayload, ClearingProvider, ProviderError, ensure_clearing_provider,
};
use crate::domain::integration::{ClearingIntegration, ClearingProviderId};
use crate::domain::ordering::Order;
use crate::domain::shared::{Money, OrderId, TransactionId};
use crate::infrastructure::http_client::{HttpResponse, RequestOptions};
use crate::infrastructure::providers::endpoint::ProviderEndpoint;

use super::api_types::{
    ApiResponse, AuthorizationHeader, CallbackBody, Customer, GenerateLinkData,
    GenerateLinkRequest, IpnData, IpnRequest, Item, PayPlusCredentials,
};
use super::signature::{self, SIGNATURE_HEADER};

/// PayPlus REST adapter.
///
/// Every response body is authenticated with the venue's secret key before
/// it is decoded.
#[derive(Debug, Clone)]
pub struct PayPlusProvider {
    endpoint: ProviderEndpoint,
}

impl PayPlusProvider {
    /// Create a new PayPlus adapter.
    #[must_use]
    pub const fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    fn credentials(integration: &ClearingIntegration) -> Result<PayPlusCredentials, ProviderError> {
        ensure_clearing_provider(ClearingProviderId::PayPlus, integration)?;
        integration
            .credentials()
            .map_err(|e| ProviderError::InvalidCredentials {
                message: format!("payplus: {e}"),
            })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        credentials: &PayPlusCredentials,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let authorization = serde_json::to_string(&AuthorizationHeader {
            api_key: &credentials.api_key,
            secret_key: &credentials.secret_key,
        })?;

        let response = self
            .endpoint
            .send(
                operation,
                self.endpoint.url(path)?,
                RequestOptions::post()
                    .header("Authorization", authorization)
                    .json(body),
            )
            .await?;

        decode_signed(&response, &credentials.secret_key)
    }
}

/// Authenticate the raw body, then decode it and unwrap `data`.
fn decode_signed<T: DeserializeOwned>(
    response: &HttpResponse,
    secret_key: &str,
) -> Result<T, ProviderError> {
    signature::verify(secret_key, response.bytes(), response.header(SIGNATURE_HEADER))?;

    let envelope: ApiResponse<T> = response.json()?;
    if !envelope.results.is_success() {
        return Err(ProviderError::Rejected {
            code: envelope.results.code(),
            message: envelope.results.description,
        });
    }
    envelope
        .data
        .ok_or_else(|| ProviderError::content("successful response without data"))
}

fn number(money: Money) -> Result<serde_json::Number, ProviderError> {
    Ok(serde_json::Number::from_str(&money.amount().normalize().to_string())?)
}

#[async_trait]
impl ClearingProvider for PayPlusProvider {
    fn id(&self) -> ClearingProviderId {
        ClearingProviderId::PayPlus
    }

    async fn get_clearing_page_link(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<Url, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(Item {
                    name: &item.name,
                    quantity: item.quantity,
                    price: number(item.unit_price)?,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let request = GenerateLinkRequest {
            payment_page_uid: &credentials.payment_page_uid,
            amount: number(order.total_cost)?,
            currency_code: "ILS",
            more_info: order.id.as_str(),
            callback_url: self.endpoint.settings().callback_url.as_ref().map(Url::as_str),
            customer: Customer {
                customer_name: &order.customer.name,
                phone: &order.customer.phone,
            },
            items,
        };

        let data: GenerateLinkData = self
            .post(
                "get_clearing_page_link",
                "PaymentPages/generateLink",
                &credentials,
                serde_json::to_value(&request)?,
            )
            .await?;

        tracing::debug!(
            order_id = %order.id,
            page_request_uid = data.page_request_uid.as_deref().unwrap_or_default(),
            "PayPlus payment page created"
        );
        Url::parse(data.payment_page_link.trim())
            .map_err(|e| ProviderError::content(format!("invalid payment page link: {e}")))
    }

    async fn validate_transaction(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<TransactionId, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let request = IpnRequest {
            payment_page_uid: &credentials.payment_page_uid,
            more_info: order.id.as_str(),
        };

        let data: IpnData = self
            .post(
                "validate_transaction",
                "PaymentPages/ipn",
                &credentials,
                serde_json::to_value(&request)?,
            )
            .await?;

        if !self.endpoint.settings().is_success(&data.status_code) {
            return Err(ProviderError::Rejected {
                code: data.status_code,
                message: format!("transaction for order {} not approved", order.id),
            });
        }
        if let Some(more_info) = data.more_info.as_deref()
            && more_info != order.id.as_str()
        {
            return Err(ProviderError::content(format!(
                "transaction belongs to order '{more_info}', expected '{}'",
                order.id
            )));
        }
        if let Some(amount) = data.amount
            && Money::new(amount) != order.total_cost
        {
            return Err(ProviderError::content(format!(
                "charged {amount}, order total is {}",
                order.total_cost
            )));
        }

        let tx_id = data
            .transaction_uid
            .filter(|uid| !uid.trim().is_empty())
            .ok_or_else(|| ProviderError::content("approved transaction without transaction_uid"))?;

        tracing::info!(order_id = %order.id, tx_id = %tx_id, "PayPlus transaction approved");
        Ok(TransactionId::new(tx_id.trim()))
    }

    fn callback_order_id(&self, payload: &CallbackPayload) -> Result<OrderId, ProviderError> {
        let body: CallbackBody = serde_json::from_slice(&payload.body)?;
        let order_id = body.transaction.more_info.trim();
        if order_id.is_empty() {
            return Err(ProviderError::content("callback without transaction.more_info"));
        }
        Ok(OrderId::new(order_id))
    }

    fn verify_callback(
        &self,
        integration: &ClearingIntegration,
        payload: &CallbackPayload,
    ) -> Result<(), ProviderError> {
        let credentials = Self::credentials(integration)?;
        signature::verify(
            &credentials.secret_key,
            &payload.body,
            payload.signature.as_deref(),
        )
    }
}
