//! Outbound HTTP client shared by every provider.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use url::Url;

use super::error::HttpError;
use super::response::HttpResponse;

/// Largest error body kept in an error, in characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Default per-request deadline.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("order-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Raw text with an explicit content type.
    Text {
        /// Value of the `Content-Type` header.
        content_type: String,
        /// Body text.
        body: String,
    },
}

/// Everything about a request except its URL.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: Vec<(String, String)>,
    body: RequestBody,
    timeout: Option<Duration>,
}

impl RequestOptions {
    /// A request with the given method and no body.
    #[must_use]
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    /// A GET request.
    #[must_use]
    pub const fn get() -> Self {
        Self::new(Method::GET)
    }

    /// A POST request.
    #[must_use]
    pub const fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Send a JSON body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Send form fields.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Override the client's default deadline for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the deadline if one is given.
    #[must_use]
    pub fn maybe_timeout(self, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) => self.timeout(timeout),
            None => self,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// HTTP client facade.
///
/// Translates every outcome into [`HttpError`]: transport failures and
/// timeouts become `Request`, retryable statuses `Server`, any other
/// non-success status `Client`. Successful bodies are buffered into an
/// [`HttpResponse`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `Request` if the TLS backend cannot be initialized.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            default_timeout: config.timeout,
        })
    }

    /// Perform one request. Never retries.
    pub async fn request(&self, url: &Url, options: RequestOptions) -> Result<HttpResponse, HttpError> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let method = options.method.clone();

        let mut request = self
            .client
            .request(options.method, url.clone())
            .timeout(timeout);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match options.body {
            RequestBody::Empty => request,
            RequestBody::Json(body) => request.json(&body),
            RequestBody::Form(fields) => request.form(&fields),
            RequestBody::Text { content_type, body } => request
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body),
        };

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::debug!(
                method = %method,
                url = %url,
                timed_out = e.is_timeout(),
                error = %e,
                "HTTP transport failure"
            );
            HttpError::from(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "HTTP response"
        );

        if status.is_success() {
            return Ok(HttpResponse::new(status.as_u16(), headers, body));
        }

        let body = truncate(&String::from_utf8_lossy(&body));
        match categorize_status(status) {
            ErrorCategory::Retryable => Err(HttpError::Server {
                status: status.as_u16(),
                body,
            }),
            ErrorCategory::NonRetryable => Err(HttpError::Client {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

/// Error category for breaker accounting.
enum ErrorCategory {
    Retryable,
    NonRetryable,
}

/// Categorize a non-success HTTP status.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        408 | 429 | 500..=599 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
