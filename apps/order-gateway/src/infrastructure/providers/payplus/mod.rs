//! PayPlus clearing provider (JSON REST with HMAC-signed bodies).

mod adapter;
mod api_types;
mod signature;

pub use adapter::PayPlusProvider;
pub use api_types::PayPlusCredentials;
pub use signature::{SIGNATURE_HEADER, sign, verify};
