//! Request counters for the gateway.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Gateway metrics.
pub struct Metrics {
    /// Total requests handled.
    pub requests_total: AtomicU64,
    /// Requests answered from the cache.
    pub cache_hits: AtomicU64,
    /// Requests that went to the providers.
    pub cache_misses: AtomicU64,
    /// Fresh successful responses.
    pub responses_ok: AtomicU64,
    /// 503 responses after every provider failed.
    pub responses_degraded: AtomicU64,
    /// Cache reads that errored and were treated as misses.
    pub cache_read_errors: AtomicU64,
    /// Successful background cache writes.
    pub cache_writes: AtomicU64,
    /// Failed background cache writes.
    pub cache_write_errors: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            responses_ok: AtomicU64::new(0),
            responses_degraded: AtomicU64::new(0),
            cache_read_errors: AtomicU64::new(0),
            cache_writes: AtomicU64::new(0),
            cache_write_errors: AtomicU64::new(0),
        }
    }

    pub fn request_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn response_ok(&self) {
        self.responses_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn response_degraded(&self) {
        self.responses_degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_read_failed(&self) {
        self.cache_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_written(&self) {
        self.cache_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_write_failed(&self) {
        self.cache_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            responses_ok: self.responses_ok.load(Ordering::Relaxed),
            responses_degraded: self.responses_degraded.load(Ordering::Relaxed),
            cache_read_errors: self.cache_read_errors.load(Ordering::Relaxed),
            cache_writes: self.cache_writes.load(Ordering::Relaxed),
            cache_write_errors: self.cache_write_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub responses_ok: u64,
    pub responses_degraded: u64,
    pub cache_read_errors: u64,
    pub cache_writes: u64,
    pub cache_write_errors: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.request_received();
        metrics.request_received();
        metrics.cache_hit();
        metrics.cache_miss();
        metrics.response_degraded();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.responses_degraded, 1);
        assert_eq!(snapshot.responses_ok, 0);
    }
}
