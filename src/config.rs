//! Configuration management for Wayfare
//!
//! This module provides unified configuration management with first-run
//! initialization, multi-source loading, environment overrides and
//! zero-config defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::cache::{CacheBackend, CacheConfig};
use crate::app::client::ClientConfig;
use crate::auth::TokenEntry;
use crate::constants::{cache_durations, env as env_constants, files, http, server};
use crate::errors::{ConfigError, ConfigResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfigToml,
    /// Document store settings
    pub store: StoreConfigToml,
    /// Cache-aside settings
    pub cache: CacheConfigToml,
    /// Flight provider settings
    pub flights: FlightsConfigToml,
    /// Bearer token table
    pub auth: AuthConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfigToml {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Allowed CORS origins (empty = any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfigToml {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_string(),
            port: server::DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

/// TOML-friendly document store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfigToml {
    /// Snapshot file (None = user data directory)
    pub snapshot_path: Option<PathBuf>,
}

/// TOML-friendly cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigToml {
    /// `memory` or `redis`
    pub backend: CacheBackend,
    /// Redis connection URL
    pub redis_url: Option<String>,
    /// TTL for provider results in seconds (0 = do not cache)
    pub short_ttl_secs: u64,
    /// TTL for internal search results in seconds (0 = do not cache)
    pub medium_ttl_secs: u64,
}

impl Default for CacheConfigToml {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: None,
            short_ttl_secs: cache_durations::SHORT.as_secs(),
            medium_ttl_secs: cache_durations::MEDIUM.as_secs(),
        }
    }
}

/// TOML-friendly flight provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightsConfigToml {
    /// Provider base URL (None = search stored flights)
    pub base_url: Option<String>,
    /// Provider API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for FlightsConfigToml {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
        }
    }
}

/// TOML-friendly identity configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfigToml {
    /// Accepted bearer tokens and the principals they map to
    pub tokens: Vec<TokenEntry>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI arguments are applied by the caller on top of the result.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path }.into());
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `WAYFARE_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(env_constants::PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid {}={}", env_constants::PORT, port),
            }
        }

        if let Some(url) = lookup(env_constants::REDIS_URL).filter(|u| !u.trim().is_empty()) {
            self.cache.backend = CacheBackend::Redis;
            self.cache.redis_url = Some(url);
        }

        if let Some(key) = lookup(env_constants::FLIGHT_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.flights.api_key = Some(key);
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }

        if self.cache.backend == CacheBackend::Redis
            && self.cache.redis_url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "cache.redis_url".to_string(),
                value: String::new(),
                reason: "The redis backend needs a connection URL".to_string(),
            });
        }

        for (field, secs) in [
            ("cache.short_ttl_secs", self.cache.short_ttl_secs),
            ("cache.medium_ttl_secs", self.cache.medium_ttl_secs),
        ] {
            if secs > cache_durations::MAX.as_secs() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: secs.to_string(),
                    reason: format!(
                        "TTL must not exceed {} seconds",
                        cache_durations::MAX.as_secs()
                    ),
                });
            }
        }

        for entry in &self.auth.tokens {
            if entry.token.trim().is_empty() || entry.uid.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "auth.tokens".to_string(),
                    value: entry.uid.clone(),
                    reason: "Every token entry needs a token and a uid".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            field: "server.host".to_string(),
            value: self.server.host.clone(),
            reason: "Expected an IP address".to_string(),
        })
    }

    /// Snapshot file for the document store
    pub fn snapshot_path(&self) -> PathBuf {
        self.store.snapshot_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join(files::APP_DIR).join(files::SNAPSHOT_FILE))
                .unwrap_or_else(|| PathBuf::from(files::SNAPSHOT_FILE))
        })
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file at `path` (or the user config location)
    /// if none exists and returns its path.
    pub async fn initialize_first_run(path: Option<PathBuf>) -> Result<PathBuf> {
        let config_path = match path {
            Some(path) => path,
            None => Self::get_default_config_path()?,
        };

        if config_path.exists() {
            return Ok(config_path);
        }

        info!("Creating default configuration file...");

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;

        println!("Created default configuration file:");
        println!("   {}", config_path.display());
        println!("   You can customize settings by editing this file.");
        println!();

        Ok(config_path)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            PathBuf::from("./wayfare.toml"),
            PathBuf::from("./config.toml"),
        ];
        if let Ok(path) = Self::get_default_config_path() {
            search_paths.push(path);
        }
        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/wayfare/config.toml"));

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_dir".to_string(),
            value: String::new(),
            reason: "Could not determine user config directory".to_string(),
        })?;

        Ok(config_dir.join(files::APP_DIR).join(files::CONFIG_FILE))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# Wayfare Configuration
# You can customize any of these settings to suit your needs.

[server]
host = "{}"
port = {}
# Allowed CORS origins; empty allows any origin
cors_origins = []

[store]
# Snapshot file for the document store (leave unset for the user data directory)
# snapshot_path = "/var/lib/wayfare/store.json"

[cache]
# "memory" or "redis" (WAYFARE_REDIS_URL switches to redis)
backend = "memory"
# redis_url = "redis://127.0.0.1:6379"
# Third-party provider results
short_ttl_secs = {}
# Internal search results
medium_ttl_secs = {}

[flights]
# Live flight offers provider; stored flights are searched when unset
# base_url = "https://flights.example.com/v1"
# api_key = "..."  # or WAYFARE_FLIGHT_API_KEY
request_timeout_secs = {}
connect_timeout_secs = {}

[auth]
# Bearer tokens accepted by the API
# [[auth.tokens]]
# token = "change-me"
# uid = "admin-1"
# role = "admin"  # user, owner, admin
tokens = []

[logging]
level = "info"  # error, warn, info, debug, trace
"#,
            server::DEFAULT_HOST,
            server::DEFAULT_PORT,
            cache_durations::SHORT.as_secs(),
            cache_durations::MEDIUM.as_secs(),
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
        )
    }
}

impl CacheConfigToml {
    /// Convert to runtime CacheConfig
    pub fn to_runtime_config(&self) -> CacheConfig {
        CacheConfig {
            backend: self.backend,
            redis_url: self.redis_url.clone(),
            short_ttl: Duration::from_secs(self.short_ttl_secs),
            medium_ttl: Duration::from_secs(self.medium_ttl_secs),
        }
    }
}

impl FlightsConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..Default::default()
        }
    }
}
