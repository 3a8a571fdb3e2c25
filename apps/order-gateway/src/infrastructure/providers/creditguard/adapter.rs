//! CreditGuard clearing adapter implementing `ClearingProvider`.

use async_trait::async_trait;
use url::Url;

use crate::application::ports::{ClearingProvider, ProviderError, ensure_clearing_provider};
use crate::domain::integration::{ClearingIntegration, ClearingProviderId};
use crate::domain::ordering::Order;
use crate::domain::shared::TransactionId;
use crate::infrastructure::http_client::RequestOptions;
use crate::infrastructure::providers::endpoint::ProviderEndpoint;

use super::api_types::{
    AshraitRequest, AshraitResponse, CreditGuardCredentials, DoDealRequest, GatewayRequest,
    GatewayResponse, InquireTransactionsRequest, PROTOCOL_VERSION,
};

const RELAY_PATH: &str = "xpo/Relay";

/// CreditGuard XML gateway adapter.
#[derive(Debug, Clone)]
pub struct CreditGuardProvider {
    endpoint: ProviderEndpoint,
}

impl CreditGuardProvider {
    /// Create a new CreditGuard adapter.
    #[must_use]
    pub const fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    fn credentials(
        integration: &ClearingIntegration,
    ) -> Result<CreditGuardCredentials, ProviderError> {
        ensure_clearing_provider(ClearingProviderId::CreditGuard, integration)?;
        integration
            .credentials()
            .map_err(|e| ProviderError::InvalidCredentials {
                message: format!("creditguard: {e}"),
            })
    }

    /// Post one `<ashrait>` command and decode the gateway's answer.
    async fn relay(
        &self,
        operation: &'static str,
        credentials: &CreditGuardCredentials,
        request: &AshraitRequest<'_>,
    ) -> Result<GatewayResponse, ProviderError> {
        let xml = quick_xml::se::to_string(request)
            .map_err(|e| ProviderError::content(format!("cannot encode ashrait request: {e}")))?;

        let response = self
            .endpoint
            .send(
                operation,
                self.endpoint.url(RELAY_PATH)?,
                RequestOptions::post().form(vec![
                    ("user".to_string(), credentials.user.clone()),
                    ("password".to_string(), credentials.password.clone()),
                    ("int_in".to_string(), xml),
                ]),
            )
            .await?;

        tracing::debug!(
            command = request.request.command,
            request_id = %request.request.request_id,
            "Ashrait relay answered"
        );
        let body = response.text()?;
        let envelope: AshraitResponse = quick_xml::de::from_str(body)
            .map_err(|e| ProviderError::content(format!("invalid ashrait response: {e}")))?;
        let gateway = envelope.response;

        if gateway.command != request.request.command {
            return Err(ProviderError::content(format!(
                "expected '{}' response, got '{}'",
                request.request.command, gateway.command
            )));
        }
        if !self.endpoint.settings().is_success(&gateway.result) {
            return Err(ProviderError::Rejected {
                code: gateway.result,
                message: gateway.message,
            });
        }

        Ok(gateway)
    }
}

#[async_trait]
impl ClearingProvider for CreditGuardProvider {
    fn id(&self) -> ClearingProviderId {
        ClearingProviderId::CreditGuard
    }

    async fn get_clearing_page_link(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<Url, ProviderError> {
        let credentials = Self::credentials(integration)?;
        let total = order
            .total_cost
            .to_minor_units()
            .ok_or_else(|| ProviderError::content(format!("total {} out of range", order.total_cost)))?;
        let success_url = self.endpoint.settings().callback_url.as_ref().map(Url::as_str);

        let request = AshraitRequest {
            request: GatewayRequest {
                version: PROTOCOL_VERSION,
                language: "HEB",
                request_id: uuid::Uuid::new_v4().to_string(),
                command: "doDeal",
                do_deal: Some(DoDealRequest {
                    terminal_number: &credentials.terminal_number,
                    card_no: "CGMPI",
                    total,
                    transaction_type: "Debit",
                    credit_type: "RegularCredit",
                    currency: "ILS",
                    transaction_code: "Internet",
                    validation: "TxnSetup",
                    mid: &credentials.mid,
                    uniqueid: order.id.as_str(),
                    mpi_validation: "autoComm",
                    success_url,
                }),
                inquire_transactions: None,
            },
        };

        let gateway = self.relay("get_clearing_page_link", &credentials, &request).await?;
        let deal = gateway
            .do_deal
            .ok_or_else(|| ProviderError::content("doDeal response without <doDeal>"))?;
        let link = deal
            .hosted_page_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::content("doDeal response without mpiHostedPageUrl"))?;

        Url::parse(link.trim())
            .map_err(|e| ProviderError::content(format!("invalid hosted page URL: {e}")))
    }

    async fn validate_transaction(
        &self,
        integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<TransactionId, ProviderError> {
        let credentials = Self::credentials(integration)?;

        let request = AshraitRequest {
            request: GatewayRequest {
                version: PROTOCOL_VERSION,
                language: "HEB",
                request_id: uuid::Uuid::new_v4().to_string(),
                command: "inquireTransactions",
                do_deal: None,
                inquire_transactions: Some(InquireTransactionsRequest {
                    terminal_number: &credentials.terminal_number,
                    query_name: "mpiTransaction",
                    mid: &credentials.mid,
                    uniqueid: order.id.as_str(),
                }),
            },
        };

        let gateway = self.relay("validate_transaction", &credentials, &request).await?;
        let rows = gateway
            .inquire_transactions
            .map(|i| i.rows)
            .unwrap_or_default();
        let row = rows
            .into_iter()
            .find(|row| row.uniqueid == order.id.as_str())
            .ok_or_else(|| ProviderError::not_found(format!("creditguard transaction for order {}", order.id)))?;

        if !self.endpoint.settings().is_success(&row.status_code) {
            return Err(ProviderError::Rejected {
                code: row.status_code,
                message: format!("transaction for order {} not approved", order.id),
            });
        }
        if let (Some(charged), Some(expected)) = (row.total, order.total_cost.to_minor_units()) {
            if charged != expected {
                return Err(ProviderError::content(format!(
                    "charged {charged} minor units, order total is {expected}"
                )));
            }
        }

        let tx_id = row
            .cg_uid
            .filter(|uid| !uid.trim().is_empty())
            .ok_or_else(|| ProviderError::content("approved transaction without cgUid"))?;

        tracing::info!(order_id = %order.id, tx_id = %tx_id, "CreditGuard transaction approved");
        Ok(TransactionId::new(tx_id.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::sample_order;
    use crate::domain::integration::ClearingProviderId;
    use crate::domain::shared::VenueId;
    use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
    use crate::infrastructure::providers::endpoint::ProviderSettings;
    use crate::resilience::{BreakerConfig, CircuitBreaker, ManualClock};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, success_codes: &[&str]) -> CreditGuardProvider {
        CreditGuardProvider::new(ProviderEndpoint::new(
            "creditguard",
            HttpClient::new(&HttpClientConfig::default()).unwrap(),
            Arc::new(CircuitBreaker::new(
                "creditguard",
                BreakerConfig::default(),
                Arc::new(ManualClock::default()),
            )),
            ProviderSettings::new(Url::parse(&server.uri()).unwrap(), success_codes),
        ))
    }

    fn integration() -> ClearingIntegration {
        ClearingIntegration {
            venue_id: VenueId::new("v1"),
            provider: ClearingProviderId::CreditGuard,
            credentials: json!({
                "user": "relay-user",
                "password": "relay-pass",
                "terminal_number": "0962210",
                "mid": "938"
            }),
        }
    }

    fn inquire_response(result: &str, status: &str, total: i64) -> String {
        format!(
            "<ashrait><response><command>inquireTransactions</command>\
             <result>{result}</result><message>Permitted transaction.</message>\
             <inquireTransactions><row><uniqueid>42</uniqueid><statusCode>{status}</statusCode>\
             <cgUid>25485263</cgUid><total>{total}</total></row></inquireTransactions>\
             </response></ashrait>"
        )
    }

    #[tokio::test]
    async fn hosted_page_link_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xpo/Relay"))
            .and(body_string_contains("user=relay-user"))
            .and(body_string_contains("int_in=%3Cashrait%3E"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ashrait><response><command>doDeal</command><result>000</result>\
                 <message/><doDeal><status>000</status>\
                 <mpiHostedPageUrl>https://cguat2.creditguard.co.il/CGMPI_Server/PerformTransaction?txId=abc</mpiHostedPageUrl>\
                 </doDeal></response></ashrait>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let url = provider(&server, &["000"])
            .get_clearing_page_link(&integration(), &sample_order())
            .await
            .unwrap();

        assert_eq!(url.host_str(), Some("cguat2.creditguard.co.il"));
        assert_eq!(url.query(), Some("txId=abc"));
    }

    #[tokio::test]
    async fn approved_transaction_returns_cg_uid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("inquireTransactions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(inquire_response("000", "000", 8400)))
            .mount(&server)
            .await;

        let tx_id = provider(&server, &["000"])
            .validate_transaction(&integration(), &sample_order())
            .await
            .unwrap();

        assert_eq!(tx_id, TransactionId::new("25485263"));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(inquire_response("000", "033", 8400)))
            .mount(&server)
            .await;

        let err = provider(&server, &["000"])
            .validate_transaction(&integration(), &sample_order())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { ref code, .. } if code == "033"));
    }

    #[tokio::test]
    async fn success_codes_come_from_configuration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(inquire_response("000", "001", 8400)))
            .mount(&server)
            .await;

        let tx_id = provider(&server, &["000", "001"])
            .validate_transaction(&integration(), &sample_order())
            .await
            .unwrap();

        assert_eq!(tx_id.as_str(), "25485263");
    }

    #[tokio::test]
    async fn amount_mismatch_is_a_content_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(inquire_response("000", "000", 100)))
            .mount(&server)
            .await;

        let err = provider(&server, &["000"])
            .validate_transaction(&integration(), &sample_order())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Content { .. }));
    }

    #[tokio::test]
    async fn malformed_xml_is_a_content_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = provider(&server, &["000"])
            .validate_transaction(&integration(), &sample_order())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Content { .. }));
    }

    #[tokio::test]
    async fn foreign_integration_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut payplus = integration();
        payplus.provider = ClearingProviderId::PayPlus;

        let err = provider(&server, &["000"])
            .validate_transaction(&payplus, &sample_order())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::ProviderMismatch { .. }));
    }
}
