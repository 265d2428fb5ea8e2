//! Per-request orchestration: cache lookup, provider fallback, write-back.

use std::sync::Arc;
use std::time::Duration;

use ratefeed_common::AggregatedPayload;
use ratefeed_fx::{Credentials, FallbackAggregator, FxResult};
use tracing::{error, info, instrument, warn};

use crate::cache::{RequestIdentity, ResponseCache};
use crate::config::GatewayConfig;
use crate::metrics::SharedMetrics;
use crate::response::{public_max_age, CachedResponse};
use crate::store::CacheStore;
use crate::tasks::DeferredTasks;

const NO_STORE: &str = "no-store";

/// Answers every inbound request with the current rate payload.
///
/// Each request ends in one of three ways: the cached reply is re-emitted
/// unchanged; fresh rates are served with status 200 and cached; or every
/// provider failed and a 503 is served that is never cached.
pub struct RequestHandler {
    aggregator: FallbackAggregator,
    cache: ResponseCache,
    credentials: Credentials,
    metrics: SharedMetrics,
    cache_ttl: Duration,
}

impl RequestHandler {
    pub fn new(
        aggregator: FallbackAggregator,
        cache: ResponseCache,
        credentials: Credentials,
        metrics: SharedMetrics,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            aggregator,
            cache,
            credentials,
            metrics,
            cache_ttl,
        }
    }

    /// Wire the handler from configuration.
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<dyn CacheStore>,
        tasks: DeferredTasks,
        credentials: Credentials,
        metrics: SharedMetrics,
    ) -> FxResult<Self> {
        let aggregator = FallbackAggregator::from_config(&config.fx)?;
        let cache = ResponseCache::new(store, tasks, metrics.clone());
        Ok(Self::new(aggregator, cache, credentials, metrics, config.cache_ttl))
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    /// Handle one request.
    #[instrument(skip_all, fields(key = %identity))]
    pub async fn handle(&self, identity: RequestIdentity) -> CachedResponse {
        self.metrics.request_received();

        if let Some(cached) = self.cache.lookup(&identity).await {
            self.metrics.cache_hit();
            return cached;
        }
        self.metrics.cache_miss();

        let payload = match self.aggregator.resolve(&self.credentials).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Serving degraded response");
                return self.degraded(&e.to_string());
            }
        };

        let body = match payload.to_json() {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize rate payload");
                return self.degraded(&e.to_string());
            }
        };

        let reply = CachedResponse::json(200, body, public_max_age(self.cache_ttl));
        self.cache.store(identity, reply.clone());
        self.metrics.response_ok();
        info!(updated_at = payload.updated_at, "Served fresh rates");

        reply
    }

    fn degraded(&self, cause: &str) -> CachedResponse {
        self.metrics.response_degraded();
        let body = AggregatedPayload::failure(cause)
            .to_json()
            .unwrap_or_else(|_| r#"{"success":false,"error":"internal error"}"#.to_string());
        CachedResponse::json(503, body, NO_STORE)
    }
}
