//! Buffered HTTP response.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::error::HttpError;

/// A successful response with its body fully read.
///
/// The body is kept as raw bytes. [`HttpResponse::text`] and
/// [`HttpResponse::json`] decode it on demand and fail independently of
/// each other, so a body that is not valid JSON can still be read as text
/// (and vice versa for non-UTF-8 JSON).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response from its parts.
    #[must_use]
    pub const fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Raw body, byte for byte as received.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Header value, if present and valid ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str, HttpError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| HttpError::content(format!("body is not UTF-8: {e}")))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HttpError::content(format!("body is not valid JSON: {e}")))
    }
}
