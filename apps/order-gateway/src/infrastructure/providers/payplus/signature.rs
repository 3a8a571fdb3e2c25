//! PayPlus `hash` header: base64(HMAC-SHA256(secret_key, raw body)).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::application::ports::ProviderError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on responses and callbacks.
pub const SIGNATURE_HEADER: &str = "hash";

fn mac(secret: &str, body: &[u8]) -> Result<HmacSha256, ProviderError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| ProviderError::InvalidCredentials {
            message: format!("payplus secret key unusable: {e}"),
        })?;
    mac.update(body);
    Ok(mac)
}

/// Signature PayPlus would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, ProviderError> {
    Ok(STANDARD.encode(mac(secret, body)?.finalize().into_bytes()))
}

/// Check `signature` against the raw `body` in constant time.
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> Result<(), ProviderError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::SignatureVerification {
            message: format!("missing '{SIGNATURE_HEADER}' header"),
        })?;
    let expected = STANDARD
        .decode(signature)
        .map_err(|e| ProviderError::SignatureVerification {
            message: format!("'{SIGNATURE_HEADER}' header is not base64: {e}"),
        })?;

    mac(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| ProviderError::SignatureVerification {
            message: "HMAC does not match body".to_string(),
        })
}
