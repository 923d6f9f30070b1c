//! Application constants for Wayfare
//!
//! This module centralizes the constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides `[server] port`
    pub const PORT: &str = "WAYFARE_PORT";

    /// Overrides `[cache] redis_url` and switches the backend to Redis
    pub const REDIS_URL: &str = "WAYFARE_REDIS_URL";

    /// Overrides `[flights] api_key`
    pub const FLIGHT_API_KEY: &str = "WAYFARE_FLIGHT_API_KEY";
}

/// Cache time-to-live presets
pub mod cache_durations {
    use super::Duration;

    /// External API results
    pub const SHORT: Duration = Duration::from_secs(60 * 5);

    /// Internal search results
    pub const MEDIUM: Duration = Duration::from_secs(60 * 30);

    pub const LONG: Duration = Duration::from_secs(60 * 60 * 24);

    pub const WEEK: Duration = Duration::from_secs(60 * 60 * 24 * 7);

    /// Longest TTL accepted from configuration or the admin API
    pub const MAX: Duration = Duration::from_secs(60 * 60 * 24 * 30);

    /// How often the in-process backend drops expired entries
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
}

/// Cache key prefixes
pub mod cache_keys {
    pub const HOTEL: &str = "hotel";
    pub const HOTEL_SEARCH: &str = "hotel:search";
    pub const BUS_SEARCH: &str = "bus:search";
    pub const FLIGHT_SEARCH: &str = "flight:search";
}

/// Defaults for new hotel and room listings
pub mod catalog {
    /// Cover image used when an owner lists a hotel without one
    pub const DEFAULT_COVER_IMAGE: &str = "https://placehold.co/1200x800.png";

    pub const DEFAULT_ROOM_CAPACITY: u32 = 2;
}

/// HTTP server defaults
pub mod server {
    use super::Duration;

    pub const DEFAULT_HOST: &str = "0.0.0.0";

    pub const DEFAULT_PORT: u16 = 8080;

    /// CORS preflight cache lifetime
    pub const CORS_MAX_AGE: Duration = Duration::from_secs(60 * 60);
}

/// Outbound HTTP client defaults
pub mod http {
    use super::Duration;

    /// Default user agent for provider requests
    pub const USER_AGENT: &str = concat!("Wayfare/", env!("CARGO_PKG_VERSION"));

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    pub const POOL_MAX_PER_HOST: usize = 16;

    /// Header carrying the provider API key
    pub const API_KEY_HEADER: &str = "x-api-key";
}

/// File names used by the store and config loader
pub mod files {
    /// Directory under the user data dir holding the store snapshot
    pub const APP_DIR: &str = "wayfare";

    pub const SNAPSHOT_FILE: &str = "store.json";

    pub const CONFIG_FILE: &str = "config.toml";

    /// Suffix for temporary files during atomic writes
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";
}

// Re-export commonly used constants at the top level
pub use server::DEFAULT_PORT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_durations_are_ordered() {
        assert!(cache_durations::SHORT < cache_durations::MEDIUM);
        assert!(cache_durations::MEDIUM < cache_durations::LONG);
        assert!(cache_durations::LONG < cache_durations::WEEK);
        assert!(cache_durations::WEEK < cache_durations::MAX);
        assert_eq!(cache_durations::SHORT.as_secs(), 300);
        assert_eq!(cache_durations::MEDIUM.as_secs(), 1800);
    }

    #[test]
    fn test_user_agent() {
        assert!(http::USER_AGENT.starts_with("Wayfare/"));
    }
}
