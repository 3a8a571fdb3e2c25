//! In-memory repositories for development and testing.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::{IntegrationRepository, OrderRepository, RepositoryError};
use crate::domain::integration::{ClearingIntegration, ManagementIntegration};
use crate::domain::ordering::{Order, OrderState};
use crate::domain::shared::{OrderId, TransactionId, VenueId};

/// In-memory implementation of `OrderRepository`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
    writes: AtomicUsize,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order (for seeding). Does not count as a write.
    pub fn insert(&self, order: Order) {
        self.orders
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(order.id.clone(), order);
    }

    /// Current copy of an order.
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of state writes performed through the port.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: &OrderId, apply: impl FnOnce(&mut Order)) -> Result<(), RepositoryError> {
        let mut orders = self
            .orders
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let order = orders
            .get_mut(id)
            .ok_or_else(|| RepositoryError::OrderNotFound(id.clone()))?;
        apply(order);
        drop(orders);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn set_paid(&self, id: &OrderId, tx_id: &TransactionId) -> Result<(), RepositoryError> {
        self.update(id, |order| {
            order.state = OrderState::PaidFor;
            order.tx_id = Some(tx_id.clone());
        })
    }

    async fn set_state(&self, id: &OrderId, state: OrderState) -> Result<(), RepositoryError> {
        self.update(id, |order| order.state = state)
    }
}

/// In-memory implementation of `IntegrationRepository`.
#[derive(Debug, Default)]
pub struct InMemoryIntegrationRepository {
    clearing: RwLock<HashMap<VenueId, ClearingIntegration>>,
    management: RwLock<HashMap<VenueId, ManagementIntegration>>,
}

impl InMemoryIntegrationRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire a venue to a clearing provider.
    pub fn insert_clearing(&self, integration: ClearingIntegration) {
        self.clearing
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(integration.venue_id.clone(), integration);
    }

    /// Wire a venue to a point-of-sale provider.
    pub fn insert_management(&self, integration: ManagementIntegration) {
        self.management
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(integration.venue_id.clone(), integration);
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrationRepository {
    async fn clearing_integration(
        &self,
        venue_id: &VenueId,
    ) -> Result<Option<ClearingIntegration>, RepositoryError> {
        Ok(self
            .clearing
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(venue_id)
            .cloned())
    }

    async fn management_integration(
        &self,
        venue_id: &VenueId,
    ) -> Result<Option<ManagementIntegration>, RepositoryError> {
        Ok(self
            .management
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(venue_id)
            .cloned())
    }
}
