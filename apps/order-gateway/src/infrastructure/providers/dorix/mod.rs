//! Dorix point-of-sale provider.

mod adapter;
mod api_types;

pub use adapter::{DorixProvider, map_status};
pub use api_types::DorixCredentials;
