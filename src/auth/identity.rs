//! Principal, verifier trait and the static token table verifier

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::Role;
use crate::errors::{AuthError, AuthResult};

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier, also the user document id
    pub uid: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn new(uid: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require an exact role match
    pub fn require_role(&self, required: Role) -> AuthResult<()> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole {
                required: required.as_str().to_string(),
            })
        }
    }

    /// Whether this principal may act on a resource owned by `owner_uid`
    pub fn can_access(&self, owner_uid: &str) -> bool {
        self.uid == owner_uid || self.is_admin()
    }
}

/// Turns a bearer credential into a [`Principal`]
#[async_trait]
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug {
    async fn verify(&self, token: &str) -> AuthResult<Principal>;
}

/// One row of the static token table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Verifier backed by a fixed token table from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    pub fn from_entries(entries: impl IntoIterator<Item = TokenEntry>) -> Self {
        let tokens = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.token,
                    Principal {
                        uid: entry.uid,
                        email: entry.email,
                        role: entry.role,
                    },
                )
            })
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> AuthResult<Principal> {
        match self.tokens.get(token) {
            Some(principal) => Ok(principal.clone()),
            None => {
                debug!("Token verification failed: unknown token");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
