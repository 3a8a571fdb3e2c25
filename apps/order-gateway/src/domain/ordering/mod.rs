//! Ordering Bounded Context
//!
//! The order aggregate and its lifecycle state.

mod order;
mod order_state;

pub use order::{Customer, Order, OrderItem};
pub use order_state::OrderState;
