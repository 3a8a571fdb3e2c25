//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod clearing_link;
mod order_locks;
mod payment_callback;
mod query_error;
mod reconcile_order;
mod venue_menu;

#[cfg(test)]
pub(crate) mod test_support;

pub use clearing_link::ClearingLinkUseCase;
pub use order_locks::{OrderGuard, OrderLocks};
pub use payment_callback::{CallbackError, CallbackOutcome, PaymentCallbackUseCase};
pub use query_error::QueryError;
pub use reconcile_order::{ReconcileError, ReconcileOrderUseCase, STAGES, Stage};
pub use venue_menu::VenueMenuUseCase;
