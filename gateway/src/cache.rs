//! Cache-aside access to the response cache service.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::metrics::SharedMetrics;
use crate::response::CachedResponse;
use crate::store::CacheStore;
use crate::tasks::DeferredTasks;

/// Normalized identity of an inbound request: method plus URL.
///
/// Headers never take part, and the fragment is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity(String);

impl RequestIdentity {
    pub fn new(method: &str, url: &str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        Self(format!("{} {}", method.trim().to_ascii_uppercase(), url.trim()))
    }

    /// Cache key.
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-through lookups and fire-and-forget writes over a [`CacheStore`].
///
/// Cache failures never fail a request: a read error is a miss, a write
/// error is logged.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    tasks: DeferredTasks,
    metrics: SharedMetrics,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, tasks: DeferredTasks, metrics: SharedMetrics) -> Self {
        Self {
            store,
            tasks,
            metrics,
        }
    }

    /// Look up a response. Present means fresh enough; the store handles
    /// expiry.
    pub async fn lookup(&self, identity: &RequestIdentity) -> Option<CachedResponse> {
        match self.store.get(identity.key()).await {
            Ok(Some(entry)) => {
                debug!(key = %identity, "Cache hit");
                Some(entry)
            }
            Ok(None) => {
                debug!(key = %identity, "Cache miss");
                None
            }
            Err(e) => {
                self.metrics.cache_read_failed();
                warn!(key = %identity, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Schedule a write in the background. The caller does not wait, but the
    /// write is tracked and finishes before shutdown.
    pub fn store(&self, identity: RequestIdentity, entry: CachedResponse) {
        let store = self.store.clone();
        let metrics = self.metrics.clone();

        self.tasks.spawn(async move {
            match store.put(identity.key(), entry).await {
                Ok(()) => {
                    metrics.cache_written();
                    debug!(key = %identity, "Cached response");
                }
                Err(e) => {
                    metrics.cache_write_failed();
                    warn!(key = %identity, error = %e, "Cache write failed");
                }
            }
        });
    }
}
