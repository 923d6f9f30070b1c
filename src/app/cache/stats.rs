//! Cache statistics
//!
//! Counters are updated lock-free from concurrent handlers and read as a
//! point-in-time [`CacheStats`] snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Live counters shared by every clone of a [`super::SearchCache`]
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    backend_errors: AtomicU64,
    compute_failures: AtomicU64,
}

impl CacheCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_error(&self) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compute_failure(&self) {
        self.compute_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
            compute_failures: self.compute_failures.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to compute
    pub misses: u64,
    /// Successful writes of computed results
    pub stores: u64,
    /// Swallowed backend failures on read or write
    pub backend_errors: u64,
    /// Compute calls that returned an error (never cached)
    pub compute_failures: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.lookups() == 0 {
            return 0.0;
        }
        (self.hits as f64 / self.lookups() as f64) * 100.0
    }

    /// Whether the backend has failed at least once
    pub fn is_degraded(&self) -> bool {
        self.backend_errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = CacheCounters::default();
        counters.record_hit();
        counters.record_miss();
        counters.record_miss();
        counters.record_store();

        let stats = counters.snapshot();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.stores, 1);
        assert_eq!(stats.lookups(), 3);
        assert!(!stats.is_degraded());
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
    }
}
