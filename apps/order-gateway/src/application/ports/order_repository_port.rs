//! Order Repository Port (Driven Port)
//!
//! Narrow persistence interface used by the reconciliation engine: read an
//! order, write its state.

use async_trait::async_trait;

use crate::domain::ordering::{Order, OrderState};
use crate::domain::shared::{OrderId, TransactionId};

/// Persistence error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The order to update does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },
}

/// Port for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Load an order.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Record a confirmed payment: state `PaidFor` and the clearing
    /// transaction, in one write.
    async fn set_paid(&self, id: &OrderId, tx_id: &TransactionId) -> Result<(), RepositoryError>;

    /// Overwrite the order state.
    async fn set_state(&self, id: &OrderId, state: OrderState) -> Result<(), RepositoryError>;
}
