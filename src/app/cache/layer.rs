//! Cache-aside wrapper around expensive search computations

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::stats::{CacheCounters, CacheStats};
use super::store::{CacheStore, MemoryCacheStore};

/// Read-through cache over a [`CacheStore`]
///
/// The cache is never authoritative. Backend failures are logged and counted
/// and the call falls back to computing the value, so a dead cache costs
/// latency, never correctness.
#[derive(Debug, Clone)]
pub struct SearchCache {
    store: Arc<dyn CacheStore>,
    counters: Arc<CacheCounters>,
}

impl SearchCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// Cache backed by a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    /// Underlying store, for direct key administration
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Return the cached value under `key`, or run `compute` and cache its result
    ///
    /// A hit never invokes `compute`. On a miss the computed value is stored
    /// with `ttl` unless `ttl` is zero. Errors from `compute` are returned as-is
    /// and nothing is written for them.
    pub async fn cached_search<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup::<T>(key).await {
            self.counters.record_hit();
            debug!("Cache hit for {}", key);
            return Ok(value);
        }

        self.counters.record_miss();
        debug!("Cache miss for {}", key);

        let value = match compute().await {
            Ok(value) => value,
            Err(e) => {
                self.counters.record_compute_failure();
                return Err(e);
            }
        };

        if !ttl.is_zero() {
            self.populate(key, &value, ttl).await;
        }

        Ok(value)
    }

    /// Drop `key` after the record behind it changed
    ///
    /// Backend failures are logged and counted like any other cache error; the
    /// stale entry then lives until its TTL runs out.
    pub async fn invalidate(&self, key: &str) {
        match self.store.delete(key).await {
            Ok(removed) => debug!("Invalidated {} (present: {})", key, removed),
            Err(e) => {
                self.counters.record_backend_error();
                warn!(
                    "Cache invalidation failed on {} backend for {}: {}",
                    self.store.backend_name(),
                    key,
                    e
                );
            }
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                self.counters.record_backend_error();
                warn!(
                    "Cache read failed on {} backend for {}: {}",
                    self.store.backend_name(),
                    key,
                    e
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                self.counters.record_backend_error();
                warn!("Could not serialize result for {}: {}", key, e);
                return;
            }
        };

        match self.store.set(key, &payload, Some(ttl)).await {
            Ok(()) => self.counters.record_store(),
            Err(e) => {
                self.counters.record_backend_error();
                warn!(
                    "Cache write failed on {} backend for {}: {}",
                    self.store.backend_name(),
                    key,
                    e
                );
            }
        }
    }
}
