//! Wayfare Library
//!
//! Booking and search backend for hotels, buses and flights. Room bookings go
//! through an availability checker that rejects overlapping stays, and search
//! results are served through a cache-aside layer with fixed TTLs.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;
pub mod server;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_PORT, 8080);
        assert_eq!(env::REDIS_URL, "WAYFARE_REDIS_URL");
        assert!(http::USER_AGENT.contains("Wayfare"));
    }

    #[test]
    fn test_error_types() {
        let auth_error = errors::AuthError::InvalidToken;
        let app_error = AppError::Auth(auth_error);

        assert_eq!(app_error.category(), "authentication");
        assert!(app_error.is_user_correctable());
    }
}
