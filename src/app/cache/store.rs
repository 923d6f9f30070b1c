//! Cache store contract and the in-process backend

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::errors::CacheResult;

/// Key/value cache with optional per-key expiry
///
/// Values are opaque serialized payloads. An expired key behaves exactly like
/// an absent one.
#[async_trait]
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value`; `None` means no expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove `key`, returning whether it was present
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process [`CacheStore`]
///
/// Expiry uses tokio's clock so tests can drive it with a paused runtime.
/// Expired entries are dropped lazily on access, by [`Self::purge_expired`],
/// and periodically once [`Self::spawn_sweeper`] is running.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }
        purged
    }

    /// Purge expired entries every `every` until the store is dropped
    ///
    /// The task only holds a weak reference, so it ends on the first tick
    /// after the last strong handle goes away.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("Cache store dropped, stopping sweeper");
                    break;
                };
                store.purge_expired().await;
            }
        })
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock, re-checking in case it was refreshed
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        // A TTL past the end of the clock's range is treated as no expiry
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired(Instant::now())))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
