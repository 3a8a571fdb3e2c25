//! Error shared by the read-through query use cases.

use crate::application::ports::{ProviderError, RepositoryError};
use crate::domain::ordering::OrderState;
use crate::domain::shared::OrderId;

/// Failure of a provider-backed query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Order, venue integration or provider does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// The order is not in a state that allows this query.
    #[error("Order {order_id} is {state}")]
    InvalidState {
        /// Order queried.
        order_id: OrderId,
        /// Its current state.
        state: OrderState,
    },

    /// The provider could not be reached (breaker open or transport failure).
    #[error("Provider unreachable: {0}")]
    ProviderUnreachable(ProviderError),

    /// The provider answered with an error.
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ProviderError> for QueryError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { what } => Self::NotFound { what },
            err if err.is_unreachable() => Self::ProviderUnreachable(err),
            err => Self::Provider(err),
        }
    }
}
