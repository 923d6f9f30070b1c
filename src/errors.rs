//! Error types for Wayfare
//!
//! Each component gets its own error enum so callers can tell user-correctable
//! failures (validation, conflict, not found, auth) apart from upstream ones
//! (store, cache, provider). The top-level [`AppError`] folds them together for
//! the CLI and carries a category for logging.

use std::path::PathBuf;

use thiserror::Error;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Snapshot file could not be read or written
    #[error("Store I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid JSON for the store schema
    #[error("Store snapshot is corrupted: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Backend refused or failed the operation
    #[error("Store backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Cache backend errors
///
/// These never escape [`crate::app::cache::SearchCache::cached_search`]; they are
/// only returned by direct [`crate::app::cache::CacheStore`] calls.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis command or connection failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Value could not be encoded or decoded
    #[error("Cache value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is not reachable
    #[error("Cache backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Booking errors, one variant per response class of the booking API
#[derive(Error, Debug)]
pub enum BookingError {
    /// Malformed or missing input
    #[error("{reason}")]
    Validation { reason: String },

    /// Overlapping stay or terminal state
    #[error("{reason}")]
    Conflict { reason: String },

    /// Referenced entity does not exist
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Caller is authenticated but may not act on this booking
    #[error("Forbidden")]
    Forbidden,

    /// Availability or persistence could not be determined
    #[error("Storage unavailable")]
    StorageUnavailable(#[from] StoreError),
}

impl BookingError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }
}

/// Hotel and room listing errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Malformed or missing input
    #[error("{reason}")]
    Validation { reason: String },

    /// Referenced entity does not exist
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Caller may not modify this listing
    #[error("{reason}")]
    Forbidden { reason: String },

    /// Backing store failed
    #[error("Catalog storage failure")]
    Storage(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }
}

/// Third-party search provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP transport failure
    #[error("Provider request failed")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}")]
    BadStatus { status: u16 },

    /// Base URL plus path did not form a valid URL
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Provider has no API key or base URL
    #[error("Provider is not configured: {reason}")]
    NotConfigured { reason: String },
}

/// Search errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// Missing or invalid query parameters
    #[error("{reason}")]
    Validation { reason: String },

    /// Backing store failed
    #[error("Search storage failure")]
    Storage(#[from] StoreError),

    /// Third-party provider failed
    #[error("Search provider failure")]
    Provider(#[from] ProviderError),
}

/// Identity errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    #[error("Unauthorized")]
    MissingToken,

    /// Token not recognised by the identity verifier
    #[error("Unauthorized")]
    InvalidToken,

    /// Authenticated principal lacks the required role
    #[error("Forbidden - Insufficient permissions")]
    InsufficientRole { required: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Could not read or write the configuration file
    #[error("Configuration file I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether the caller can fix the error by changing the request
    pub fn is_user_correctable(&self) -> bool {
        match self {
            AppError::Booking(
                BookingError::Validation { .. }
                | BookingError::Conflict { .. }
                | BookingError::NotFound { .. }
                | BookingError::Forbidden,
            )
            | AppError::Search(SearchError::Validation { .. })
            | AppError::Catalog(
                CatalogError::Validation { .. }
                | CatalogError::NotFound { .. }
                | CatalogError::Forbidden { .. },
            )
            | AppError::Auth(_)
            | AppError::Config(_) => true,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Store(_) => "store",
            AppError::Cache(_) => "cache",
            AppError::Booking(_) => "booking",
            AppError::Search(_) => "search",
            AppError::Catalog(_) => "catalog",
            AppError::Provider(_) => "provider",
            AppError::Auth(_) => "authentication",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

pub type BookingResult<T> = std::result::Result<T, BookingError>;

pub type SearchResult<T> = std::result::Result<T, SearchError>;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

pub type AuthResult<T> = std::result::Result<T, AuthError>;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
