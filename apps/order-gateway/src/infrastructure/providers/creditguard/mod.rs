//! CreditGuard clearing provider (XML gateway protocol).

mod adapter;
mod api_types;

pub use adapter::CreditGuardProvider;
pub use api_types::CreditGuardCredentials;
