//! Core application logic for Wayfare
//!
//! This module contains the domain models, the document store, the
//! availability checker, the booking, listing and search services, the
//! cache-aside layer and outbound provider clients.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use wayfare::app::{AvailabilityChecker, MemoryStore, StayRange};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let checker = AvailabilityChecker::new(store);
//!
//! let stay = StayRange::parse("2025-01-05", "2025-01-10")?;
//! assert!(!checker.is_stay_overlapping("room-1", &stay).await?);
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod booking;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod models;
pub mod search;
pub mod store;

// Re-export main public API
pub use availability::{first_conflict, spans_overlap, AvailabilityChecker};
pub use booking::{BookingService, NewBooking};
pub use cache::{CacheStats, CacheStore, HotelSearchQuery, RouteQuery, SearchCache};
pub use catalog::{CatalogService, HotelReview, NewHotel, NewRoom};
pub use client::{ClientConfig, FlightProvider, HttpFlightProvider};
pub use models::{Reservation, ReservationStatus, Role, StayRange};
pub use search::{BusResults, FlightResults, HotelResults, SearchService, SearchTtls};
pub use store::{CancelOutcome, DocumentStore, InsertOutcome, MemoryStore, Snapshot};
