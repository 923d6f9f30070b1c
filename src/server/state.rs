//! Shared handler state, built once at startup

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{info, warn};

use super::error::ApiError;
use crate::app::cache::{self, SearchCache};
use crate::app::client::{FlightProvider, HttpFlightProvider};
use crate::app::store::{DocumentStore, MemoryStore};
use crate::app::{BookingService, CatalogService, SearchService, SearchTtls};
use crate::auth::{bearer_token, IdentityVerifier, Principal, StaticTokenVerifier};
use crate::config::AppConfig;
use crate::errors::Result;

/// Process-wide handles shared by every request
#[derive(Debug)]
pub struct AppState {
    pub bookings: BookingService,
    pub catalog: CatalogService,
    pub search: SearchService,
    pub cache: SearchCache,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Assemble state from already-built components
    pub fn new(
        store: Arc<dyn DocumentStore>,
        search: SearchService,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Arc<Self> {
        let cache = search.cache().clone();
        Arc::new(Self {
            bookings: BookingService::new(Arc::clone(&store)),
            catalog: CatalogService::new(store, cache.clone()),
            search,
            cache,
            verifier,
        })
    }

    /// Build every client handle from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the store snapshot cannot be loaded
    pub async fn build(config: &AppConfig) -> Result<Arc<Self>> {
        let snapshot_path = config.snapshot_path();
        info!("Opening document store at {}", snapshot_path.display());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::open(snapshot_path).await?);

        let cache_config = config.cache.to_runtime_config();
        let cache_store = cache::build_store(&cache_config).await;
        info!("Using {} cache backend", cache_store.backend_name());
        let cache = SearchCache::new(cache_store);

        let mut search =
            SearchService::new(store.clone(), cache).with_ttls(SearchTtls::from(&cache_config));

        let client_config = config.flights.to_runtime_config();
        if client_config.is_configured() {
            match HttpFlightProvider::new(&client_config) {
                Ok(provider) => {
                    info!("Flight search uses provider at {}", provider.endpoint());
                    let provider: Arc<dyn FlightProvider> = Arc::new(provider);
                    search = search.with_flight_provider(provider);
                }
                Err(e) => warn!("Flight provider disabled: {}", e),
            }
        } else {
            info!("No flight provider configured, searching stored flights");
        }

        let verifier = StaticTokenVerifier::from_entries(config.auth.tokens.clone());
        if verifier.is_empty() {
            warn!("No API tokens configured; authenticated routes will reject every request");
        }

        Ok(Self::new(store, search, Arc::new(verifier)))
    }
}

/// Verified caller, extracted from the `Authorization` header
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;
        let principal = state.verifier.verify(token).await?;
        Ok(AuthUser(principal))
    }
}
