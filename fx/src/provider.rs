//! Rate provider trait and shared HTTP plumbing.

use async_trait::async_trait;
use ratefeed_common::RateMapping;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{FxError, FxResult};

/// Normalized output of one successful provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderRates {
    /// Units per 1 USD for every symbol the provider could parse.
    pub rates: RateMapping,
    /// Latest quote time reported by the provider, unix seconds.
    pub freshness: Option<i64>,
}

impl ProviderRates {
    /// Create from a mapping without a freshness marker.
    pub fn new(rates: RateMapping) -> Self {
        Self {
            rates,
            freshness: None,
        }
    }

    /// Attach a freshness marker.
    pub fn with_freshness(mut self, freshness: Option<i64>) -> Self {
        self.freshness = freshness;
        self
    }
}

/// An upstream source of USD-based rates.
///
/// One call, one outcome: implementations make at most one outbound request
/// and never retry.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch and normalize rates for the configured symbol universe.
    ///
    /// Fails when a required credential is missing, the request fails, the
    /// body is malformed, or no entry produced a usable rate.
    async fn resolve(&self, credentials: &Credentials) -> FxResult<ProviderRates>;
}

/// A JSON number that some providers send as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    pub(crate) fn as_unix_seconds(&self) -> Option<i64> {
        match self {
            Numeric::Number(n) if n.is_finite() => Some(*n as i64),
            Numeric::Number(_) => None,
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Build the HTTP client shared by a provider.
pub(crate) fn http_client(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Send a request and decode the body as JSON. Non-2xx is an error.
pub(crate) async fn fetch_json(provider: &str, request: RequestBuilder) -> FxResult<Value> {
    let response = request.send().await.map_err(|e| FxError::Transport {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FxError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    let text = response.text().await.map_err(|e| FxError::Transport {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    debug!(provider, bytes = text.len(), "Provider responded");

    serde_json::from_str(&text).map_err(|e| FxError::Parse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Scripted outcome for [`MockRateProvider`].
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Rates(ProviderRates),
    Fail(String),
}

/// Mock rate provider for testing. Counts every `resolve` call.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    outcome: MockOutcome,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// A provider that succeeds with the given rates.
    pub fn with_rates(name: impl Into<String>, rates: ProviderRates) -> Self {
        Self::new(name, MockOutcome::Rates(rates))
    }

    /// A provider that always fails with a transport error.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, MockOutcome::Fail(message.into()))
    }

    /// A provider that succeeds with an empty mapping.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, MockOutcome::Rates(ProviderRates::default()))
    }

    fn new(name: impl Into<String>, outcome: MockOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of `resolve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, _credentials: &Credentials) -> FxResult<ProviderRates> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Rates(rates) => Ok(rates.clone()),
            MockOutcome::Fail(message) => Err(FxError::Transport {
                provider: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Serve a router on an ephemeral local port and return its base URL.
#[cfg(test)]
pub(crate) async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use ratefeed_common::Symbol;

    #[test]
    fn test_numeric_parsing() {
        let text: Numeric = serde_json::from_str("\" 5.25 \"").unwrap();
        let number: Numeric = serde_json::from_str("5.25").unwrap();
        let junk: Numeric = serde_json::from_str("\"n/a\"").unwrap();

        assert_eq!(text.as_f64(), Some(5.25));
        assert_eq!(number.as_f64(), Some(5.25));
        assert_eq!(junk.as_f64(), None);

        let ts: Numeric = serde_json::from_str("\"1700000000\"").unwrap();
        assert_eq!(ts.as_unix_seconds(), Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_fetch_json_non_2xx() {
        let router = Router::new().route("/", get(|| async { (StatusCode::BAD_GATEWAY, "down") }));
        let base = spawn_upstream(router).await;

        let client = http_client(None);
        let err = fetch_json("test", client.get(&base)).await.unwrap_err();

        assert!(matches!(err, FxError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_fetch_json_malformed_body() {
        let router = Router::new().route("/", get(|| async { "<html>oops</html>" }));
        let base = spawn_upstream(router).await;

        let client = http_client(None);
        let err = fetch_json("test", client.get(&base)).await.unwrap_err();

        assert!(matches!(err, FxError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_mock_provider_counts_calls() {
        let mut rates = RateMapping::new();
        rates.insert(Symbol::new("BRL"), 5.0);
        let provider = MockRateProvider::with_rates("mock", ProviderRates::new(rates));

        let credentials = Credentials::new();
        provider.resolve(&credentials).await.unwrap();
        provider.resolve(&credentials).await.unwrap();

        assert_eq!(provider.calls(), 2);
    }
}
