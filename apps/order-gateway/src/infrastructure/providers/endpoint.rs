//! Breaker-guarded access to one vendor's HTTP API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::application::ports::ProviderError;
use crate::infrastructure::http_client::{HttpClient, HttpResponse, RequestOptions};
use crate::observability::record_provider_request;
use crate::resilience::CircuitBreaker;

/// Per-vendor settings resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Root of the vendor API.
    pub base_url: Url,
    /// Result codes the vendor uses for success.
    pub success_codes: Vec<String>,
    /// Deadline overriding the HTTP client default.
    pub timeout: Option<Duration>,
    /// Where the vendor should push asynchronous notifications.
    pub callback_url: Option<Url>,
}

impl ProviderSettings {
    /// Settings with a base URL and the given success codes.
    #[must_use]
    pub fn new(base_url: Url, success_codes: &[&str]) -> Self {
        Self {
            base_url,
            success_codes: success_codes.iter().map(|c| (*c).to_string()).collect(),
            timeout: None,
            callback_url: None,
        }
    }

    /// Returns true if `code` is one of the configured success codes.
    #[must_use]
    pub fn is_success(&self, code: &str) -> bool {
        self.success_codes.iter().any(|c| c == code.trim())
    }
}

/// A vendor API reached through the shared HTTP client and the vendor's
/// circuit breaker.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    provider: &'static str,
    http: HttpClient,
    breaker: Arc<CircuitBreaker>,
    settings: ProviderSettings,
}

impl ProviderEndpoint {
    /// Create an endpoint.
    #[must_use]
    pub const fn new(
        provider: &'static str,
        http: HttpClient,
        breaker: Arc<CircuitBreaker>,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            provider,
            http,
            breaker,
            settings,
        }
    }

    /// Vendor name used in logs and metrics.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Breaker guarding this endpoint.
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Absolute URL for a path below the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ProviderError> {
        let joined = format!(
            "{}/{}",
            self.settings.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ProviderError::InvalidCredentials {
            message: format!("cannot build {} URL from '{joined}': {e}", self.provider),
        })
    }

    /// Absolute URL for `segments` below the base URL.
    ///
    /// Each segment is percent-encoded, so identifiers containing `/`, `?` or
    /// `#` stay inside their own path segment.
    pub fn url_with_segments(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::InvalidCredentials {
                message: format!(
                    "{} base URL '{}' cannot carry a path",
                    self.provider, self.settings.base_url
                ),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request through the breaker.
    ///
    /// Transport and status failures are translated into [`ProviderError`]
    /// before the breaker classifies them.
    pub async fn send(
        &self,
        operation: &'static str,
        url: Url,
        options: RequestOptions,
    ) -> Result<HttpResponse, ProviderError> {
        let options = options.maybe_timeout(self.settings.timeout);
        let started = Instant::now();

        let result = self
            .breaker
            .call(|| async move {
                self.http
                    .request(&url, options)
                    .await
                    .map_err(ProviderError::from)
            })
            .await;

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(response) => {
                record_provider_request(self.provider, operation, "ok", elapsed);
                tracing::debug!(
                    provider = self.provider,
                    operation,
                    status = response.status(),
                    elapsed_ms = elapsed * 1000.0,
                    "Provider call succeeded"
                );
            }
            Err(err) => {
                record_provider_request(self.provider, operation, err.kind(), elapsed);
                tracing::warn!(
                    provider = self.provider,
                    operation,
                    error = %err,
                    "Provider call failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;
    use crate::resilience::{BreakerConfig, BreakerState, ManualClock};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_endpoint(base: &str, max_failures: u32) -> ProviderEndpoint {
        let breaker = Arc::new(CircuitBreaker::new(
            "test-vendor",
            BreakerConfig {
                max_failures,
                cooldown: Duration::from_secs(30),
            },
            Arc::new(ManualClock::default()),
        ));
        ProviderEndpoint::new(
            "test-vendor",
            HttpClient::new(&HttpClientConfig::default()).unwrap(),
            breaker,
            ProviderSettings::new(Url::parse(base).unwrap(), &["000"]),
        )
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let endpoint = test_endpoint("https://api.example.test/api/v1.0/", 3);
        assert_eq!(
            endpoint.url("/PaymentPages/generateLink").unwrap().as_str(),
            "https://api.example.test/api/v1.0/PaymentPages/generateLink"
        );
        let bare = test_endpoint("https://api.example.test", 3);
        assert_eq!(
            bare.url("v1/order").unwrap().as_str(),
            "https://api.example.test/v1/order"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let endpoint = test_endpoint("https://api.example.test/api/", 3);
        assert_eq!(
            endpoint
                .url_with_segments(&["v1", "order", "a/b?c#d", "status"])
                .unwrap()
                .as_str(),
            "https://api.example.test/api/v1/order/a%2Fb%3Fc%23d/status"
        );
        let bare = test_endpoint("https://api.example.test", 3);
        assert_eq!(
            bare.url_with_segments(&["v1", "menu", "b 1"]).unwrap().as_str(),
            "https://api.example.test/v1/menu/b%201"
        );
    }

    #[test]
    fn success_codes_are_configurable() {
        let settings = ProviderSettings::new(Url::parse("https://x.test").unwrap(), &["000", "0"]);
        assert!(settings.is_success("000"));
        assert!(settings.is_success(" 0 "));
        assert!(!settings.is_success("033"));
    }

    #[tokio::test]
    async fn repeated_server_errors_open_the_breaker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let endpoint = test_endpoint(&server.uri(), 2);
        let url = endpoint.url("status").unwrap();

        for _ in 0..2 {
            let err = endpoint
                .send("status", url.clone(), RequestOptions::get())
                .await
                .unwrap_err();
            assert!(matches!(err, ProviderError::Server { status: 503, .. }));
        }
        assert!(matches!(
            endpoint.breaker().state(),
            BreakerState::Open { .. }
        ));

        let rejected = endpoint
            .send("status", url, RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(rejected, ProviderError::BreakerOpen(_)));
    }

    #[tokio::test]
    async fn client_errors_leave_the_breaker_closed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let endpoint = test_endpoint(&server.uri(), 1);
        let url = endpoint.url("status").unwrap();
        let err = endpoint
            .send("status", url, RequestOptions::get())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Client { status: 400, .. }));
        assert_eq!(endpoint.breaker().state(), BreakerState::INITIAL);
    }
}
