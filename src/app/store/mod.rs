//! Document store abstraction
//!
//! The booking and search services talk to the backing database through the
//! [`DocumentStore`] trait. Queries mirror what the services need (equality
//! filters on room, user, owner, approval status) rather than a generic query
//! language.
//!
//! Reservation creation is exposed only as
//! [`DocumentStore::insert_reservation_if_available`], which must evaluate the
//! overlap predicate and the insert as one atomic step. A backend that cannot
//! do that is not a valid implementation.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::models::{ApprovalStatus, Bus, Flight, Hotel, Reservation, Room, UserProfile};
use crate::errors::StoreResult;

pub use memory::{MemoryStore, Snapshot};

/// Result of an atomic check-and-insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Reservation was persisted
    Inserted(Reservation),
    /// A confirmed reservation already holds at least one of the nights
    Conflict { existing_id: String },
}

/// Result of a cancellation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// Status flipped to cancelled
    Cancelled(Reservation),
    /// Reservation was already cancelled; nothing changed
    AlreadyCancelled,
    /// No reservation with that id
    NotFound,
}

/// Backing store for hotels, rooms, users, transport listings and reservations
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    async fn get_room(&self, room_id: &str) -> StoreResult<Option<Room>>;

    async fn get_hotel(&self, hotel_id: &str) -> StoreResult<Option<Hotel>>;

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn rooms_for_hotel(&self, hotel_id: &str) -> StoreResult<Vec<Room>>;

    /// Hotels whose listing status is `status`
    async fn hotels_with_status(&self, status: ApprovalStatus) -> StoreResult<Vec<Hotel>>;

    /// Hotels whose listing status is approved
    async fn approved_hotels(&self) -> StoreResult<Vec<Hotel>> {
        self.hotels_with_status(ApprovalStatus::Approved).await
    }

    /// Insert a new hotel listing, replacing any with the same id
    async fn create_hotel(&self, hotel: Hotel) -> StoreResult<()>;

    /// Insert a new room, replacing any with the same id
    async fn create_room(&self, room: Room) -> StoreResult<()>;

    /// Set a hotel's listing status; `None` if the hotel does not exist
    async fn set_hotel_status(
        &self,
        hotel_id: &str,
        status: ApprovalStatus,
    ) -> StoreResult<Option<Hotel>>;

    async fn buses(&self) -> StoreResult<Vec<Bus>>;

    async fn flights(&self) -> StoreResult<Vec<Flight>>;

    /// All reservations for `room_id` with status confirmed
    async fn confirmed_reservations_for_room(
        &self,
        room_id: &str,
    ) -> StoreResult<Vec<Reservation>>;

    /// Insert `reservation` unless a confirmed reservation on the same room
    /// overlaps its day-truncated interval
    async fn insert_reservation_if_available(
        &self,
        reservation: Reservation,
    ) -> StoreResult<InsertOutcome>;

    async fn get_reservation(&self, reservation_id: &str) -> StoreResult<Option<Reservation>>;

    /// Flip a reservation to cancelled, stamping `cancelled_at`
    async fn cancel_reservation(
        &self,
        reservation_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<CancelOutcome>;

    /// Reservations made by `user_id`, newest first
    async fn reservations_for_user(&self, user_id: &str) -> StoreResult<Vec<Reservation>>;

    /// Reservations on hotels owned by `owner_id`, newest first
    async fn reservations_for_owner(&self, owner_id: &str) -> StoreResult<Vec<Reservation>>;
}
