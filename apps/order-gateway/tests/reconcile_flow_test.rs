//! End-to-end reconciliation tests.
//!
//! Builds the gateway from a YAML config whose providers point at wiremock
//! servers, then drives orders through the HTTP API.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use order_gateway::config::load_config_from_string;
use order_gateway::domain::integration::{
    ClearingIntegration, ClearingProviderId, ManagementIntegration, ManagementProviderId,
};
use order_gateway::domain::ordering::{Customer, Order, OrderItem, OrderState};
use order_gateway::domain::shared::{MenuItemId, Money, OrderId, TransactionId, VenueId};
use order_gateway::infrastructure::http::{AppState, create_router};
use order_gateway::infrastructure::http_client::HttpClient;
use order_gateway::infrastructure::persistence::{
    InMemoryIntegrationRepository, InMemoryOrderRepository,
};
use order_gateway::infrastructure::providers::ProviderRegistry;
use order_gateway::infrastructure::providers::payplus::{SIGNATURE_HEADER, sign};

const SECRET: &str = "pp-secret";

// =============================================================================
// Harness
// =============================================================================

struct Gateway {
    app: axum::Router,
    orders: Arc<InMemoryOrderRepository>,
}

impl Gateway {
    fn start(payplus: &MockServer, dorix: &MockServer) -> Self {
        Self::with_urls(&payplus.uri(), &dorix.uri())
    }

    fn with_urls(payplus_url: &str, dorix_url: &str) -> Self {
        let yaml = format!(
            r#"
http_client:
  timeout_ms: 2000
circuit_breakers:
  default:
    max_failures: 5
    cooldown_secs: 30
  identities:
    dorix:
      max_failures: 2
      cooldown_secs: 60
providers:
  payplus:
    enabled: true
    base_url: "{payplus_url}"
  dorix:
    enabled: true
    base_url: "{dorix_url}"
"#
        );
        let config = load_config_from_string(&yaml).unwrap();

        let http = HttpClient::new(&config.http_client.to_client_config()).unwrap();
        let breakers = Arc::new(config.circuit_breakers.to_registry());
        let providers =
            ProviderRegistry::from_config(&config.providers, &http, &breakers).unwrap();

        let orders = Arc::new(InMemoryOrderRepository::new());
        let integrations = Arc::new(InMemoryIntegrationRepository::new());
        integrations.insert_clearing(ClearingIntegration {
            venue_id: VenueId::new("v1"),
            provider: ClearingProviderId::PayPlus,
            credentials: json!({
                "api_key": "pp-key",
                "secret_key": SECRET,
                "payment_page_uid": "page-1"
            }),
        });
        integrations.insert_management(ManagementIntegration {
            venue_id: VenueId::new("v1"),
            provider: ManagementProviderId::Dorix,
            credentials: json!({ "api_token": "dx-token", "branch_id": "b-17" }),
        });

        let state = AppState::new(
            Arc::clone(&orders),
            integrations,
            Arc::new(providers),
            breakers,
            "test",
        );

        Self {
            app: create_router(state),
            orders,
        }
    }

    fn place_order(&self, id: &str) {
        self.orders.insert(Order::new(
            OrderId::new(id),
            VenueId::new("v1"),
            Money::new(dec!(84)),
            vec![OrderItem {
                menu_item_id: MenuItemId::new("burger"),
                name: "Burger".to_string(),
                quantity: 2,
                unit_price: Money::new(dec!(42)),
            }],
            Customer {
                name: "Dana".to_string(),
                phone: "050-1234567".to_string(),
            },
        ));
    }

    fn order(&self, id: &str) -> Order {
        self.orders.get(&OrderId::new(id)).unwrap()
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn reconcile(&self, id: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/orders/{id}/reconcile"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn health(&self) -> Value {
        let (_, body) = self
            .request(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await;
        body
    }
}

fn signed(body: &Value) -> ResponseTemplate {
    let raw = body.to_string();
    ResponseTemplate::new(200)
        .insert_header(SIGNATURE_HEADER, sign(SECRET, raw.as_bytes()).unwrap().as_str())
        .set_body_raw(raw, "application/json")
}

async fn approve_payment(server: &MockServer, order_id: &str) {
    Mock::given(method("POST"))
        .and(path("/PaymentPages/ipn"))
        .respond_with(signed(&json!({
            "results": { "status": "success", "code": 0, "description": "ok" },
            "data": {
                "transaction_uid": "TX1",
                "status_code": "000",
                "amount": 84,
                "more_info": order_id
            }
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn placed_order_reaches_pos_state_in_one_invocation() {
    let payplus = MockServer::start().await;
    let dorix = MockServer::start().await;
    approve_payment(&payplus, "42").await;
    Mock::given(method("POST"))
        .and(path("/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ack": true })))
        .expect(1)
        .mount(&dorix)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/order/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ACCEPTED" })))
        .expect(1)
        .mount(&dorix)
        .await;

    let gateway = Gateway::start(&payplus, &dorix);
    gateway.place_order("42");

    let (status, body) = gateway.reconcile("42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "order_id": "42", "state": "CONFIRMED" }));

    let order = gateway.order("42");
    assert_eq!(order.state, OrderState::Confirmed);
    assert_eq!(order.tx_id, Some(TransactionId::new("TX1")));
    assert_eq!(gateway.orders.write_count(), 3);
    assert_eq!(payplus.received_requests().await.unwrap().len(), 1);
    assert_eq!(dorix.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn confirmed_order_is_polled_not_re_reported() {
    let payplus = MockServer::start().await;
    let dorix = MockServer::start().await;
    approve_payment(&payplus, "42").await;
    Mock::given(method("POST"))
        .and(path("/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ack": true })))
        .expect(1)
        .mount(&dorix)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/order/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "DELIVERED" })))
        .mount(&dorix)
        .await;

    let gateway = Gateway::start(&payplus, &dorix);
    gateway.place_order("42");

    gateway.reconcile("42").await;
    let (status, body) = gateway.reconcile("42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "DELIVERED");
    assert_eq!(payplus.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn pos_outage_keeps_payment_and_opens_breaker() {
    let payplus = MockServer::start().await;
    let dorix = MockServer::start().await;
    approve_payment(&payplus, "42").await;
    Mock::given(method("POST"))
        .and(path("/v1/order"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&dorix)
        .await;

    let gateway = Gateway::start(&payplus, &dorix);
    gateway.place_order("42");

    // Payment is confirmed before the POS fails; the next attempt resumes at reporting.
    let (status, body) = gateway.reconcile("42").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["retry"], false);
    let order = gateway.order("42");
    assert_eq!(order.state, OrderState::PaidFor);
    assert_eq!(order.tx_id, Some(TransactionId::new("TX1")));

    let (status, _) = gateway.reconcile("42").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Second counted failure tripped the dorix breaker.
    let (status, body) = gateway.reconcile("42").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retry"], true);
    assert_eq!(gateway.order("42").state, OrderState::PaidFor);
    assert_eq!(payplus.received_requests().await.unwrap().len(), 1);

    let health = gateway.health().await;
    assert_eq!(health["status"], "degraded");
    let dorix_breaker = health["breakers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["name"] == "dorix")
        .unwrap();
    assert_eq!(dorix_breaker["state"], "OPEN");
}

#[tokio::test]
async fn unreachable_pos_is_reported_as_retryable() {
    let payplus = MockServer::start().await;
    approve_payment(&payplus, "42").await;

    // Reserve a port, then free it so connections are refused.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let gateway = Gateway::with_urls(&payplus.uri(), &format!("http://{dead}"));
    gateway.place_order("42");

    let (status, body) = gateway.reconcile("42").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "PROVIDER_UNREACHABLE");
    assert_eq!(body["retry"], true);
    assert_eq!(gateway.order("42").state, OrderState::PaidFor);
}

#[tokio::test]
async fn forged_payment_response_changes_nothing() {
    let payplus = MockServer::start().await;
    let dorix = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/PaymentPages/ipn"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(SIGNATURE_HEADER, "Zm9yZ2Vk")
                .set_body_json(json!({
                    "results": { "status": "success", "code": 0, "description": "ok" },
                    "data": { "transaction_uid": "EVIL", "status_code": "000", "more_info": "42" }
                })),
        )
        .mount(&payplus)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ack": true })))
        .expect(0)
        .mount(&dorix)
        .await;

    let gateway = Gateway::start(&payplus, &dorix);
    gateway.place_order("42");

    let (status, _) = gateway.reconcile("42").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let order = gateway.order("42");
    assert_eq!(order.state, OrderState::Init);
    assert_eq!(order.tx_id, None);
    assert_eq!(gateway.orders.write_count(), 0);
}

#[tokio::test]
async fn signed_callback_reconciles_the_referenced_order() {
    let payplus = MockServer::start().await;
    let dorix = MockServer::start().await;
    approve_payment(&payplus, "77").await;
    Mock::given(method("POST"))
        .and(path("/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ack": true })))
        .mount(&dorix)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/order/77/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "AWAITING_CONFIRMATION" })),
        )
        .mount(&dorix)
        .await;

    let gateway = Gateway::start(&payplus, &dorix);
    gateway.place_order("77");

    let payload = json!({ "transaction": { "more_info": "77" } }).to_string();
    let (status, body) = gateway
        .request(
            Request::builder()
                .method("POST")
                .uri("/api/v1/callbacks/payplus")
                .header(SIGNATURE_HEADER, sign(SECRET, payload.as_bytes()).unwrap())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "order_id": "77", "state": "UNCONFIRMED" }));
    assert_eq!(gateway.order("77").state, OrderState::Unconfirmed);
}
