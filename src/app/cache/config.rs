//! Cache configuration types and defaults

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::cache_durations;

/// Which cache backend to build at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map, lost on restart
    #[default]
    Memory,
    /// Shared Redis instance
    Redis,
}

/// Configuration for the cache-aside layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend to use
    pub backend: CacheBackend,
    /// Redis connection URL (required for the Redis backend)
    pub redis_url: Option<String>,
    /// TTL for third-party provider results
    pub short_ttl: Duration,
    /// TTL for internal search results
    pub medium_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: None,
            short_ttl: cache_durations::SHORT,
            medium_ttl: cache_durations::MEDIUM,
        }
    }
}

impl CacheConfig {
    /// Configuration pointing at a Redis instance
    pub fn with_redis(redis_url: impl Into<String>) -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: Some(redis_url.into()),
            ..Default::default()
        }
    }

    /// Set the TTL used for provider results
    pub fn with_short_ttl(mut self, ttl: Duration) -> Self {
        self.short_ttl = ttl;
        self
    }

    /// Set the TTL used for internal search results
    pub fn with_medium_ttl(mut self, ttl: Duration) -> Self {
        self.medium_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.short_ttl, Duration::from_secs(300));
        assert_eq!(config.medium_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::with_redis("redis://127.0.0.1:6379")
            .with_short_ttl(Duration::from_secs(60))
            .with_medium_ttl(Duration::from_secs(600));

        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.short_ttl, Duration::from_secs(60));
        assert_eq!(config.medium_ttl, Duration::from_secs(600));
    }
}
