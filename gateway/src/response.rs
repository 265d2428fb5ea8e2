//! HTTP responses as stored in and served from the cache.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CONTENT_TYPE: &str = "content-type";
pub const CACHE_CONTROL: &str = "cache-control";
pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";

/// Status, headers and body of a response, as kept by the cache service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CachedResponse {
    /// JSON response with the cross-origin and cache directives every reply
    /// carries.
    pub fn json(status: u16, body: String, cache_control: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![
                (CONTENT_TYPE.to_string(), "application/json".to_string()),
                (ALLOW_ORIGIN.to_string(), "*".to_string()),
                (CACHE_CONTROL.to_string(), cache_control.into()),
            ],
            body,
        }
    }

    /// Get a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `max-age` from the cache directive. `None` if absent, unparseable, or
    /// the directive forbids storing.
    pub fn max_age(&self) -> Option<Duration> {
        let directive = self.header(CACHE_CONTROL)?;
        let mut max_age = None;

        for part in directive.split(',').map(str::trim) {
            if part.eq_ignore_ascii_case("no-store") {
                return None;
            }
            if let Some(secs) = part.strip_prefix("max-age=") {
                max_age = secs.trim().parse().ok().map(Duration::from_secs);
            }
        }

        max_age
    }
}

/// `Cache-Control` for a cacheable reply.
pub fn public_max_age(ttl: Duration) -> String {
    format!("public, max-age={}", ttl.as_secs())
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => warn!(header = %name, "Dropping invalid header"),
            }
        }

        response
    }
}
