//! Cache service boundary and an in-process implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::response::CachedResponse;

/// Errors reported by a cache service.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache service could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// The cache service refused the entry.
    #[error("Cache rejected entry: {0}")]
    Rejected(String),
}

/// Key-value cache service holding whole responses.
///
/// Expiry is the service's job: an entry's lifetime is the `max-age` of its
/// `Cache-Control` header, and `get` never returns an expired entry.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>, CacheError>;
    async fn put(&self, key: &str, entry: CachedResponse) -> Result<(), CacheError>;
}

/// Stored entry with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct StoredEntry {
    response: CachedResponse,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl StoredEntry {
    fn is_valid(&self) -> bool {
        Utc::now().signed_duration_since(self.stored_at) < self.ttl
    }
}

/// Configuration for the in-process store.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

/// Thread-safe in-process cache store honoring each entry's `max-age`.
pub struct MemoryCacheStore {
    entries: DashMap<String, StoredEntry>,
    config: MemoryCacheConfig,
}

impl MemoryCacheStore {
    /// Create a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryCacheConfig::default())
    }

    /// Create a store with custom configuration.
    pub fn with_config(config: MemoryCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries.
    pub fn evict_expired(&self) {
        self.entries.retain(|_, entry| entry.is_valid());
    }

    /// Get store statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let valid = self.entries.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total - valid,
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid() {
                return Ok(Some(entry.response.clone()));
            }
            debug!(key, "Cache entry expired");
            drop(entry);
            self.entries.remove(key);
        }

        Ok(None)
    }

    async fn put(&self, key: &str, entry: CachedResponse) -> Result<(), CacheError> {
        let max_age = entry
            .max_age()
            .filter(|age| !age.is_zero())
            .ok_or_else(|| CacheError::Rejected("entry is not cacheable".to_string()))?;
        let ttl = Duration::from_std(max_age).map_err(|e| CacheError::Rejected(e.to_string()))?;

        if self.entries.len() >= self.config.max_entries {
            self.evict_expired();
            if self.entries.len() >= self.config.max_entries && !self.entries.contains_key(key) {
                return Err(CacheError::Rejected("cache is full".to_string()));
            }
        }

        self.entries.insert(
            key.to_string(),
            StoredEntry {
                response: entry,
                stored_at: Utc::now(),
                ttl,
            },
        );

        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}
