//! Bearer-token identity for API callers
//!
//! Requests carry `Authorization: Bearer <token>`. An [`IdentityVerifier`]
//! turns the token into a [`Principal`] (subject id plus optional role claim);
//! the booking and admin routes then apply ownership and role checks.
//!
//! # Examples
//!
//! ```rust
//! use wayfare::auth::{bearer_token, IdentityVerifier, StaticTokenVerifier, TokenEntry};
//! use wayfare::app::models::Role;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = StaticTokenVerifier::from_entries(vec![TokenEntry {
//!     token: "dev-admin".to_string(),
//!     uid: "admin-1".to_string(),
//!     email: None,
//!     role: Role::Admin,
//! }]);
//!
//! let token = bearer_token(Some("Bearer dev-admin"))?;
//! let principal = verifier.verify(token).await?;
//! assert!(principal.is_admin());
//! # Ok(())
//! # }
//! ```

pub mod identity;

// Re-export main public API
pub use identity::{bearer_token, IdentityVerifier, Principal, StaticTokenVerifier, TokenEntry};
