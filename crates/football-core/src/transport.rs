//! HTTP transport seam shared by the provider adapters.
//!
//! Adapters build a [`RemoteRequest`] and hand it to a [`Transport`]. The
//! production implementation is [`HttpTransport`] (reqwest); tests use
//! [`StaticTransport`], which serves canned bodies and counts calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use tokio::sync::Mutex;

use crate::error::{DataError, Result};

/// Query parameter names whose values are never printed.
const SECRET_PARAMS: &[&str] = &["api_token", "apikey", "api_key", "token"];

/// A GET request to a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters, in the order they are sent.
    pub query: Vec<(String, String)>,
}

impl RemoteRequest {
    /// Creates a request with no query parameters.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Returns the first value for a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(k, v)| {
                if SECRET_PARAMS.contains(&k.as_str()) {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("RemoteRequest")
            .field("url", &self.url)
            .field("query", &query)
            .finish()
    }
}

/// Sends provider requests and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Performs a GET request on behalf of `provider`.
    ///
    /// Non-success responses are errors; the body of a successful response
    /// is returned unparsed.
    async fn get(&self, provider: &str, request: &RemoteRequest) -> Result<String>;
}

/// reqwest-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, provider: &str, request: &RemoteRequest) -> Result<String> {
        tracing::debug!(provider, url = %request.url, "Remote request");

        let upstream = |message: String| DataError::Upstream {
            provider: provider.to_string(),
            message,
        };

        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| upstream(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(DataError::RateLimited {
                provider: provider.to_string(),
                retry_after,
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(upstream(format!("HTTP {status}: {text}")));
        }

        response
            .text()
            .await
            .map_err(|e| upstream(e.without_url().to_string()))
    }
}

#[derive(Debug)]
enum Canned {
    Body(String),
    Failure(String),
}

/// In-process transport serving canned bodies keyed by URL.
///
/// Query parameters are recorded but not used for matching. Unknown URLs
/// fail with [`DataError::Upstream`].
#[derive(Debug, Default)]
pub struct StaticTransport {
    routes: HashMap<String, Canned>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl StaticTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    #[must_use]
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Canned::Body(body.into()));
        self
    }

    /// Fails every request to `url`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes
            .insert(url.into(), Canned::Failure(message.into()));
        self
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, provider: &str, request: &RemoteRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        match self.routes.get(&request.url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Failure(message)) => Err(DataError::Upstream {
                provider: provider.to_string(),
                message: message.clone(),
            }),
            None => Err(DataError::Upstream {
                provider: provider.to_string(),
                message: format!("HTTP 404 Not Found: {}", request.url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let request = RemoteRequest::new("https://api.example.com/fixtures")
            .query("api_token", "secret-value")
            .query("include", "participants");
        let printed = format!("{request:?}");
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("[REDACTED]"));
        assert!(printed.contains("participants"));
        assert_eq!(request.param("api_token"), Some("secret-value"));
    }

    #[tokio::test]
    async fn test_static_transport_serves_and_counts() {
        let transport = StaticTransport::new()
            .with_response("https://a/ok", "[]")
            .with_failure("https://a/down", "boom");

        let ok = transport
            .get("test", &RemoteRequest::new("https://a/ok").query("x", "1"))
            .await
            .unwrap();
        assert_eq!(ok, "[]");

        let down = transport
            .get("test", &RemoteRequest::new("https://a/down"))
            .await;
        assert!(matches!(down, Err(DataError::Upstream { .. })));

        let missing = transport.get("test", &RemoteRequest::new("https://a/nope")).await;
        assert!(missing.is_err());

        assert_eq!(transport.calls(), 3);
        let requests = transport.requests().await;
        assert_eq!(requests[0].param("x"), Some("1"));
    }
}
