//! Process-local expiring cache
//!
//! Entries are stored as JSON values so any `Serialize + DeserializeOwned`
//! type can be cached behind a string key. Expiry is lazy: a stale entry is
//! evicted by the read that finds it, nothing sweeps in the background.
//!
//! Two concurrent misses on the same key both run their producer. That is
//! fine for the idempotent reads cached here; do not put non-idempotent
//! producers behind `with_cache` without adding per-key de-duplication.

use crate::error::Result;
use crate::telemetry::metrics::record_cache_lookup;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Cache key prefixes
pub mod keys {
    pub const DISPATCH_LOGS: &str = "dispatch_logs";
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: serde_json::Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// Shared in-memory cache. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, evicting it if it has expired
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => {
                    record_cache_lookup(false);
                    return None;
                }
                Some(entry) if !entry.is_expired(now) => {
                    match serde_json::from_value(entry.data.clone()) {
                        Ok(value) => {
                            record_cache_lookup(true);
                            return Some(value);
                        }
                        Err(e) => {
                            tracing::warn!(key, "Cache entry has unexpected shape: {}", e);
                        }
                    }
                }
                Some(_) => {}
            }
        }

        // Expired or undecodable. Only evict if no writer refreshed the entry
        // between dropping the read lock and taking the write lock.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.stored_at <= now) {
            entries.remove(key);
        }
        record_cache_lookup(false);
        None
    }

    /// Store a value, overwriting any existing entry
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let data = serde_json::to_value(value)
            .map_err(|e| anyhow::anyhow!("Cache serialize error: {}", e))?;

        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    /// Remove a single key
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Remove every key containing `pattern`
    pub async fn invalidate_pattern(&self, pattern: &str) {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.contains(pattern));
    }

    /// Remove everything
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Return the cached value or run `producer` once, store and return its result.
    ///
    /// Producer errors are passed through and nothing is cached.
    pub async fn with_cache<T, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = producer().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            tracing::warn!(key, "Failed to cache value: {}", e);
        }
        Ok(value)
    }
}
