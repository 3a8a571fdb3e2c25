//! Scripted provider doubles shared by the use case tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::json;
use url::Url;

use crate::application::ports::{
    CallbackPayload, ClearingProvider, ManagementProvider, ProviderError, ProviderLookup,
};
use crate::domain::integration::{
    ClearingIntegration, ClearingProviderId, ManagementIntegration, ManagementProviderId,
};
use crate::domain::menu::Menu;
use crate::domain::ordering::{Customer, Order, OrderItem, OrderState};
use crate::domain::shared::{MenuItemId, Money, OrderId, TransactionId, VenueId};
use crate::infrastructure::persistence::{InMemoryIntegrationRepository, InMemoryOrderRepository};

pub const ORDER_ID: &str = "42";
pub const VENUE_ID: &str = "v1";

pub struct FakeClearing {
    pub validate_result: Mutex<Result<TransactionId, ProviderError>>,
    pub validate_calls: AtomicUsize,
    pub link_calls: AtomicUsize,
    pub accept_signature: AtomicBool,
}

impl Default for FakeClearing {
    fn default() -> Self {
        Self {
            validate_result: Mutex::new(Ok(TransactionId::new("TX1"))),
            validate_calls: AtomicUsize::new(0),
            link_calls: AtomicUsize::new(0),
            accept_signature: AtomicBool::new(true),
        }
    }
}

impl FakeClearing {
    pub fn fail_with(&self, err: ProviderError) {
        *self.validate_result.lock().unwrap() = Err(err);
    }

    pub fn succeed_with(&self, tx_id: &str) {
        *self.validate_result.lock().unwrap() = Ok(TransactionId::new(tx_id));
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn reject_signatures(&self) {
        self.accept_signature.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClearingProvider for FakeClearing {
    fn id(&self) -> ClearingProviderId {
        ClearingProviderId::PayPlus
    }

    async fn get_clearing_page_link(
        &self,
        _integration: &ClearingIntegration,
        order: &Order,
    ) -> Result<Url, ProviderError> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        Url::parse(&format!("https://pay.example.test/page/{}", order.id))
            .map_err(|e| ProviderError::content(e.to_string()))
    }

    async fn validate_transaction(
        &self,
        _integration: &ClearingIntegration,
        _order: &Order,
    ) -> Result<TransactionId, ProviderError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validate_result.lock().unwrap().clone()
    }

    fn callback_order_id(&self, payload: &CallbackPayload) -> Result<OrderId, ProviderError> {
        let value: serde_json::Value = serde_json::from_slice(&payload.body)?;
        value["order_id"]
            .as_str()
            .map(OrderId::new)
            .ok_or_else(|| ProviderError::content("missing order_id"))
    }

    fn verify_callback(
        &self,
        _integration: &ClearingIntegration,
        _payload: &CallbackPayload,
    ) -> Result<(), ProviderError> {
        if self.accept_signature.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::SignatureVerification {
                message: "hash mismatch".to_string(),
            })
        }
    }
}

pub struct FakeManagement {
    pub report_result: Mutex<Result<(), ProviderError>>,
    pub status_result: Mutex<Result<OrderState, ProviderError>>,
    pub report_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl Default for FakeManagement {
    fn default() -> Self {
        Self {
            report_result: Mutex::new(Ok(())),
            status_result: Mutex::new(Ok(OrderState::Confirmed)),
            report_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeManagement {
    pub fn fail_report_with(&self, err: ProviderError) {
        *self.report_result.lock().unwrap() = Err(err);
    }

    pub fn allow_report(&self) {
        *self.report_result.lock().unwrap() = Ok(());
    }

    pub fn report_status(&self, state: Result<OrderState, ProviderError>) {
        *self.status_result.lock().unwrap() = state;
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManagementProvider for FakeManagement {
    fn id(&self) -> ManagementProviderId {
        ManagementProviderId::Dorix
    }

    async fn report_order(
        &self,
        _integration: &ManagementIntegration,
        _order: &Order,
    ) -> Result<(), ProviderError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.report_result.lock().unwrap().clone()
    }

    async fn get_order_status(
        &self,
        _integration: &ManagementIntegration,
        _order: &Order,
    ) -> Result<OrderState, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_result.lock().unwrap().clone()
    }

    async fn get_venue_menu(
        &self,
        _integration: &ManagementIntegration,
    ) -> Result<Menu, ProviderError> {
        Ok(Menu::default())
    }
}

#[derive(Default)]
pub struct FakeLookup {
    pub clearing: Arc<FakeClearing>,
    pub management: Arc<FakeManagement>,
}

impl ProviderLookup for FakeLookup {
    fn clearing(&self, id: ClearingProviderId) -> Result<Arc<dyn ClearingProvider>, ProviderError> {
        if id == ClearingProviderId::PayPlus {
            Ok(self.clearing.clone())
        } else {
            Err(ProviderError::not_found(format!("clearing provider '{id}'")))
        }
    }

    fn management(
        &self,
        _id: ManagementProviderId,
    ) -> Result<Arc<dyn ManagementProvider>, ProviderError> {
        Ok(self.management.clone())
    }
}

pub struct Fixture {
    pub orders: Arc<InMemoryOrderRepository>,
    pub integrations: Arc<InMemoryIntegrationRepository>,
    pub providers: Arc<FakeLookup>,
}

impl Fixture {
    pub fn with_order_in(state: OrderState) -> Self {
        let orders = Arc::new(InMemoryOrderRepository::new());
        orders.insert(sample_order().with_state(state));

        let integrations = Arc::new(InMemoryIntegrationRepository::new());
        integrations.insert_clearing(ClearingIntegration {
            venue_id: VenueId::new(VENUE_ID),
            provider: ClearingProviderId::PayPlus,
            credentials: json!({}),
        });
        integrations.insert_management(ManagementIntegration {
            venue_id: VenueId::new(VENUE_ID),
            provider: ManagementProviderId::Dorix,
            credentials: json!({}),
        });

        Self {
            orders,
            integrations,
            providers: Arc::new(FakeLookup::default()),
        }
    }

    pub fn order(&self) -> Order {
        self.orders.get(&OrderId::new(ORDER_ID)).unwrap()
    }

    pub fn provider_calls(&self) -> usize {
        self.providers.clearing.validate_calls()
            + self.providers.management.report_calls()
            + self.providers.management.status_calls()
    }
}

pub fn sample_order() -> Order {
    Order::new(
        OrderId::new(ORDER_ID),
        VenueId::new(VENUE_ID),
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
    )
}
