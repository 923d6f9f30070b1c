//! API error handling
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a status
//! derived from the domain error. Upstream failures are logged here and
//! answered with a fixed message so store or provider detail never reaches
//! the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::errors::{AuthError, BookingError, CacheError, CatalogError, SearchError};

/// API error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or missing input
    BadRequest(String),
    /// Missing or unrecognised bearer token
    Unauthorized,
    /// Authenticated but not allowed
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// State conflict such as an overlapping stay
    Conflict(String),
    /// Upstream failure; the message is safe to show
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message() }));
        (self.status_code(), body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => ApiError::Unauthorized,
            AuthError::InsufficientRole { .. } => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation { reason } => ApiError::BadRequest(reason),
            BookingError::Conflict { reason } => ApiError::Conflict(reason),
            BookingError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            BookingError::Forbidden => ApiError::Forbidden("Forbidden".to_string()),
            BookingError::StorageUnavailable(source) => {
                error!("Booking storage failure: {}", source);
                ApiError::internal("Failed to process booking")
            }
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation { reason } => ApiError::BadRequest(reason),
            SearchError::Storage(source) => {
                error!("Search storage failure: {}", source);
                ApiError::internal("Failed to search")
            }
            SearchError::Provider(source) => {
                error!("Search provider failure: {}", source);
                ApiError::internal("Failed to search")
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { reason } => ApiError::BadRequest(reason),
            CatalogError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CatalogError::Forbidden { reason } => ApiError::Forbidden(reason),
            CatalogError::Storage(source) => {
                error!("Catalog storage failure: {}", source);
                ApiError::internal("Failed to update listings")
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        error!("Cache backend failure: {}", err);
        ApiError::internal("Cache operation failed")
    }
}
