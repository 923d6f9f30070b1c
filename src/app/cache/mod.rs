//! Cache-aside layer for search results
//!
//! Search results are cached under keys derived from the normalized query and
//! expire after a fixed TTL; they may be stale for up to one TTL. Only single
//! hotel records are invalidated explicitly, when their status changes.
//!
//! # Module Organization
//!
//! - [`config`] - Backend selection and TTL defaults
//! - [`store`] - [`CacheStore`] contract and the in-process backend
//! - [`redis_store`] - Redis backend
//! - [`keys`] - Deterministic key generation
//! - [`layer`] - [`SearchCache::cached_search`]
//! - [`stats`] - Hit/miss/error counters
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use wayfare::app::cache::SearchCache;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let cache = SearchCache::in_memory();
//!
//! let hotels: Vec<String> = cache
//!     .cached_search("hotel:search:{}", Duration::from_secs(60), || async {
//!         Ok::<_, std::io::Error>(vec!["Sea View".to_string()])
//!     })
//!     .await?;
//!
//! assert_eq!(hotels.len(), 1);
//! assert_eq!(cache.stats().misses, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod keys;
pub mod layer;
pub mod redis_store;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::warn;

use crate::constants::cache_durations;

pub use config::{CacheBackend, CacheConfig};
pub use keys::{HotelSearchQuery, RouteQuery};
pub use layer::SearchCache;
pub use redis_store::RedisCacheStore;
pub use stats::CacheStats;
pub use store::{CacheStore, MemoryCacheStore};

/// Build the cache store selected by `config`
///
/// A Redis backend that cannot be reached at startup falls back to the
/// in-process store so the service still starts. The in-process store gets a
/// sweeper task that drops expired entries every
/// [`cache_durations::SWEEP_INTERVAL`].
pub async fn build_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match (config.backend, config.redis_url.as_deref()) {
        (CacheBackend::Redis, Some(url)) => match RedisCacheStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Redis unavailable ({}), using in-memory cache", e);
                swept_memory_store()
            }
        },
        (CacheBackend::Redis, None) => {
            warn!("Redis backend selected without a URL, using in-memory cache");
            swept_memory_store()
        }
        (CacheBackend::Memory, _) => swept_memory_store(),
    }
}

fn swept_memory_store() -> Arc<dyn CacheStore> {
    let store = Arc::new(MemoryCacheStore::new());
    store.spawn_sweeper(cache_durations::SWEEP_INTERVAL);
    store
}
