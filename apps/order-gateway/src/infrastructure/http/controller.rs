//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};

use crate::application::ports::{
    CallbackPayload, IntegrationRepository, OrderRepository, ProviderLookup,
};
use crate::application::use_cases::{
    ClearingLinkUseCase, PaymentCallbackUseCase, ReconcileOrderUseCase, VenueMenuUseCase,
};
use crate::domain::integration::ClearingProviderId;
use crate::domain::menu::Menu;
use crate::domain::shared::{OrderId, VenueId};
use crate::resilience::{BreakerRegistry, BreakerState};

use super::response::{ApiError, ClearingLinkResponse, HealthResponse, OrderStateResponse};

/// Header carrying a callback's signature.
pub const CALLBACK_SIGNATURE_HEADER: &str = "hash";

/// Application state shared across handlers.
pub struct AppState<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Use case driving an order forward.
    pub reconcile: Arc<ReconcileOrderUseCase<O, I, P>>,
    /// Use case for inbound payment notifications.
    pub payment_callback: Arc<PaymentCallbackUseCase<O, I, P>>,
    /// Use case for hosted payment pages.
    pub clearing_link: Arc<ClearingLinkUseCase<O, I, P>>,
    /// Use case for venue menus.
    pub venue_menu: Arc<VenueMenuUseCase<I, P>>,
    /// Breakers, for health reporting.
    pub breakers: Arc<BreakerRegistry>,
    /// Application version.
    pub version: String,
}

impl<O, I, P> AppState<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Wire every use case over the same repositories and providers.
    pub fn new(
        orders: Arc<O>,
        integrations: Arc<I>,
        providers: Arc<P>,
        breakers: Arc<BreakerRegistry>,
        version: impl Into<String>,
    ) -> Self {
        let reconcile = Arc::new(ReconcileOrderUseCase::new(
            Arc::clone(&orders),
            Arc::clone(&integrations),
            Arc::clone(&providers),
        ));
        let payment_callback = Arc::new(PaymentCallbackUseCase::new(
            Arc::clone(&orders),
            Arc::clone(&integrations),
            Arc::clone(&providers),
            Arc::clone(&reconcile),
        ));
        let clearing_link = Arc::new(ClearingLinkUseCase::new(
            orders,
            Arc::clone(&integrations),
            Arc::clone(&providers),
        ));
        let venue_menu = Arc::new(VenueMenuUseCase::new(integrations, providers));

        Self {
            reconcile,
            payment_callback,
            clearing_link,
            venue_menu,
            breakers,
            version: version.into(),
        }
    }
}

impl<O, I, P> Clone for AppState<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    fn clone(&self) -> Self {
        Self {
            reconcile: Arc::clone(&self.reconcile),
            payment_callback: Arc::clone(&self.payment_callback),
            clearing_link: Arc::clone(&self.clearing_link),
            venue_menu: Arc::clone(&self.venue_menu),
            breakers: Arc::clone(&self.breakers),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<O, I, P>(state: AppState<O, I, P>) -> Router
where
    O: OrderRepository + 'static,
    I: IntegrationRepository + 'static,
    P: ProviderLookup + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders/{order_id}/reconcile", post(reconcile_order))
        .route("/api/v1/orders/{order_id}/clearing-link", get(clearing_link))
        .route("/api/v1/venues/{venue_id}/menu", get(venue_menu))
        .route("/api/v1/callbacks/{provider}", post(payment_callback))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<O, I, P>(State(state): State<AppState<O, I, P>>) -> Json<HealthResponse>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    let breakers = state.breakers.snapshots();
    let degraded = breakers
        .iter()
        .any(|b| matches!(b.state, BreakerState::Open { .. }));

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: state.version.clone(),
        breakers,
    })
}

/// Reconcile one order.
async fn reconcile_order<O, I, P>(
    State(state): State<AppState<O, I, P>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStateResponse>, ApiError>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    let order_id = OrderId::new(order_id);
    let state = state.reconcile.execute(&order_id).await?;

    Ok(Json(OrderStateResponse {
        order_id: order_id.into_inner(),
        state,
    }))
}

/// Hosted payment page for an unpaid order.
async fn clearing_link<O, I, P>(
    State(state): State<AppState<O, I, P>>,
    Path(order_id): Path<String>,
) -> Result<Json<ClearingLinkResponse>, ApiError>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    let url = state.clearing_link.execute(&OrderId::new(order_id)).await?;
    Ok(Json(ClearingLinkResponse { url: url.into() }))
}

/// Venue menu as reported by its POS.
async fn venue_menu<O, I, P>(
    State(state): State<AppState<O, I, P>>,
    Path(venue_id): Path<String>,
) -> Result<Json<Menu>, ApiError>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    let menu = state.venue_menu.execute(&VenueId::new(venue_id)).await?;
    Ok(Json(menu))
}

/// Asynchronous payment notification. The body is passed on byte for byte.
async fn payment_callback<O, I, P>(
    State(state): State<AppState<O, I, P>>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OrderStateResponse>, ApiError>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    let provider_id = ClearingProviderId::parse(&provider)
        .ok_or_else(|| ApiError::not_found(format!("unknown clearing provider '{provider}'")))?;
    let signature = headers
        .get(CALLBACK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state
        .payment_callback
        .handle(provider_id, &CallbackPayload::new(body.to_vec(), signature))
        .await?;

    Ok(Json(OrderStateResponse {
        order_id: outcome.order_id.into_inner(),
        state: outcome.state,
    }))
}
