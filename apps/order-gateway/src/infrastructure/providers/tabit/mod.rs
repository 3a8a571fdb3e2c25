//! Tabit point-of-sale provider.

mod adapter;
mod api_types;

pub use adapter::{TabitProvider, map_order_state};
pub use api_types::TabitCredentials;
