//! Prelude module for the Wayfare library
//!
//! Re-exports the items most integrations need so a single
//! `use wayfare::prelude::*;` covers typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use wayfare::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(MemoryStore::open("store.json").await?);
//!     let search = SearchService::new(store.clone(), SearchCache::in_memory());
//!     let verifier = Arc::new(StaticTokenVerifier::default());
//!
//!     let state = AppState::new(store, search, verifier);
//!     let _router = wayfare::server::router(state);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, BookingError, CatalogError, Result, SearchError};

// Domain services and their inputs
pub use crate::app::{
    AvailabilityChecker, BookingService, CacheStats, CacheStore, CatalogService, ClientConfig,
    DocumentStore, FlightProvider, HotelSearchQuery, HttpFlightProvider, MemoryStore, NewBooking,
    NewHotel, NewRoom, Reservation, ReservationStatus, Role, RouteQuery, SearchCache,
    SearchService, StayRange,
};

// Identity and HTTP surface
pub use crate::auth::{IdentityVerifier, Principal, StaticTokenVerifier};
pub use crate::config::AppConfig;
pub use crate::server::AppState;
