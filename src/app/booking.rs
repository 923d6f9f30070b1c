//! Room booking service
//!
//! Creates, lists and cancels hotel room reservations. Creation runs in this
//! order and stops at the first failure:
//!
//! 1. required fields present and parseable, stay covers at least one night
//! 2. availability pre-check ([`AvailabilityChecker`])
//! 3. room, hotel and requesting user exist
//! 4. atomic check-and-insert in the store
//!
//! Step 4 repeats the overlap predicate under the store's write lock, so a
//! create that raced another one between steps 2 and 4 still ends in
//! `Conflict` instead of a double booking. A store failure at any step aborts
//! the create; nothing is retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::availability::AvailabilityChecker;
use crate::app::models::{truncate_to_day, Reservation, ReservationStatus, StayRange};
use crate::app::store::{CancelOutcome, DocumentStore, InsertOutcome};
use crate::auth::Principal;
use crate::errors::{BookingError, BookingResult};

const UNAVAILABLE: &str = "This room is unavailable for the selected dates";
const ALREADY_CANCELLED: &str = "This booking has already been cancelled";

/// Booking request body
///
/// Every field is optional at the type level so a missing one is reported as
/// a validation failure rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub room_id: Option<String>,
    pub hotel_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl NewBooking {
    pub fn new(room_id: &str, hotel_id: &str, from_date: &str, to_date: &str) -> Self {
        Self {
            room_id: Some(room_id.to_string()),
            hotel_id: Some(hotel_id.to_string()),
            from_date: Some(from_date.to_string()),
            to_date: Some(to_date.to_string()),
        }
    }

    /// Check presence of every field and parse the stay
    fn validate(&self) -> BookingResult<(&str, &str, StayRange)> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        let (Some(room_id), Some(hotel_id), Some(from), Some(to)) = (
            present(&self.room_id),
            present(&self.hotel_id),
            present(&self.from_date),
            present(&self.to_date),
        ) else {
            return Err(BookingError::validation(
                "Missing required booking information",
            ));
        };

        let stay = StayRange::parse(from, to)?;
        Ok((room_id, hotel_id, stay))
    }
}

/// Booking operations over a shared document store
#[derive(Debug, Clone)]
pub struct BookingService {
    store: Arc<dyn DocumentStore>,
    availability: AvailabilityChecker,
}

impl BookingService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let availability = AvailabilityChecker::new(Arc::clone(&store));
        Self {
            store,
            availability,
        }
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Create a confirmed reservation for `requester`
    ///
    /// # Errors
    ///
    /// - `Validation` for missing fields, bad dates, an empty stay, or a room
    ///   that does not belong to the hotel
    /// - `Conflict` if a confirmed reservation overlaps the stay
    /// - `NotFound` if the room, hotel or requesting user does not exist
    /// - `StorageUnavailable` if the store fails at any point
    pub async fn create_booking(
        &self,
        requester: &Principal,
        request: &NewBooking,
    ) -> BookingResult<Reservation> {
        let (room_id, hotel_id, stay) = request.validate()?;

        if self.availability.is_stay_overlapping(room_id, &stay).await? {
            return Err(BookingError::conflict(UNAVAILABLE));
        }

        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Room"))?;
        let hotel = self
            .store
            .get_hotel(hotel_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel"))?;
        let user = self
            .store
            .get_user(&requester.uid)
            .await?
            .ok_or_else(|| BookingError::not_found("User"))?;

        if room.hotel_id != hotel.id {
            return Err(BookingError::validation(format!(
                "Room {} does not belong to hotel {}",
                room.id, hotel.id
            )));
        }

        let nights = stay.nights();
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            user_id: requester.uid.clone(),
            room_id: room.id.clone(),
            hotel_id: hotel.id.clone(),
            from_date: stay.start_instant(),
            to_date: stay.end_instant(),
            total_price: room.price * nights as f64,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            cancelled_at: None,
            hotel_name: hotel.name,
            hotel_location: hotel.location,
            room_title: room.title,
            cover_image: hotel.cover_image,
            user_name: user.name,
            hotel_owner_id: hotel.owner_id,
        };

        match self.store.insert_reservation_if_available(reservation).await? {
            InsertOutcome::Inserted(created) => {
                info!(
                    "Booked room {} for {} from {} to {} ({} nights, total {:.2})",
                    created.room_id,
                    created.user_id,
                    stay.start(),
                    stay.end(),
                    nights,
                    created.total_price
                );
                Ok(created)
            }
            InsertOutcome::Conflict { existing_id } => {
                warn!(
                    "Room {} was booked concurrently (reservation {}); rejecting",
                    room_id, existing_id
                );
                Err(BookingError::conflict(UNAVAILABLE))
            }
        }
    }

    /// Reservations made by `requester`, newest first
    pub async fn list_bookings(&self, requester: &Principal) -> BookingResult<Vec<Reservation>> {
        Ok(self.store.reservations_for_user(&requester.uid).await?)
    }

    /// Reservations on hotels owned by `owner`, newest first
    pub async fn owner_bookings(&self, owner: &Principal) -> BookingResult<Vec<Reservation>> {
        Ok(self.store.reservations_for_owner(&owner.uid).await?)
    }

    /// Fetch one reservation; only its booker or an admin may see it
    pub async fn get_booking(
        &self,
        requester: &Principal,
        reservation_id: &str,
    ) -> BookingResult<Reservation> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Booking"))?;

        if !requester.can_access(&reservation.user_id) {
            return Err(BookingError::Forbidden);
        }
        Ok(reservation)
    }

    /// Cancel a reservation as of now
    pub async fn cancel_booking(
        &self,
        requester: &Principal,
        reservation_id: &str,
    ) -> BookingResult<Reservation> {
        self.cancel_booking_at(requester, reservation_id, Utc::now())
            .await
    }

    /// Cancel a reservation as of `now`
    ///
    /// Cancelling is refused once the check-in day (UTC) is in the past.
    pub async fn cancel_booking_at(
        &self,
        requester: &Principal,
        reservation_id: &str,
        now: DateTime<Utc>,
    ) -> BookingResult<Reservation> {
        let reservation = self.get_booking(requester, reservation_id).await?;

        if reservation.is_cancelled() {
            return Err(BookingError::conflict(ALREADY_CANCELLED));
        }

        if truncate_to_day(reservation.from_date) < truncate_to_day(now) {
            return Err(BookingError::validation(
                "Cannot cancel a booking after the check-in date has passed",
            ));
        }

        match self.store.cancel_reservation(reservation_id, now).await? {
            CancelOutcome::Cancelled(cancelled) => {
                info!("Cancelled reservation {}", cancelled.id);
                Ok(cancelled)
            }
            CancelOutcome::AlreadyCancelled => Err(BookingError::conflict(ALREADY_CANCELLED)),
            CancelOutcome::NotFound => Err(BookingError::not_found("Booking")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ApprovalStatus, Hotel, Role, Room, UserProfile};
    use crate::app::store::MemoryStore;
    use chrono::TimeZone;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store
            .insert_hotel(Hotel {
                id: "h1".to_string(),
                name: "Harbour Inn".to_string(),
                location: "Goa".to_string(),
                facilities: vec!["wifi".to_string()],
                cover_image: "https://placehold.co/1200x800.png".to_string(),
                owner_id: "owner-1".to_string(),
                status: ApprovalStatus::Approved,
            })
            .await
            .unwrap();
        store
            .insert_room(Room {
                id: "x".to_string(),
                hotel_id: "h1".to_string(),
                title: "Sea View Double".to_string(),
                price: 120.0,
                capacity: 2,
            })
            .await
            .unwrap();
        for (id, role) in [("guest-1", Role::User), ("guest-2", Role::User)] {
            store
                .insert_user(UserProfile {
                    id: id.to_string(),
                    name: format!("Guest {id}"),
                    email: String::new(),
                    role,
                })
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    fn guest(uid: &str) -> Principal {
        Principal::new(uid, Role::User)
    }

    #[tokio::test]
    async fn test_create_computes_price_and_confirms() {
        let service = BookingService::new(seeded_store().await);

        let booking = service
            .create_booking(
                &guest("guest-1"),
                &NewBooking::new("x", "h1", "2030-01-05", "2030-01-10"),
            )
            .await
            .unwrap();

        assert_eq!(booking.status, ReservationStatus::Confirmed);
        assert_eq!(booking.total_price, 600.0);
        assert_eq!(booking.user_id, "guest-1");
        assert_eq!(booking.hotel_owner_id, "owner-1");
        assert_eq!(booking.room_title, "Sea View Double");
        assert_eq!(booking.user_name, "Guest guest-1");
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let service = BookingService::new(seeded_store().await);

        let mut request = NewBooking::new("x", "h1", "2030-01-05", "2030-01-10");
        request.hotel_id = None;
        let result = service.create_booking(&guest("guest-1"), &request).await;
        assert!(matches!(result, Err(BookingError::Validation { .. })));

        let request = NewBooking::new("x", "h1", "2030-01-05", "2030-01-05");
        let result = service.create_booking(&guest("guest-1"), &request).await;
        assert!(matches!(result, Err(BookingError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_unknown_entities_are_not_found() {
        let service = BookingService::new(seeded_store().await);

        let result = service
            .create_booking(
                &guest("guest-1"),
                &NewBooking::new("nope", "h1", "2030-01-05", "2030-01-10"),
            )
            .await;
        assert!(matches!(result, Err(BookingError::NotFound { ref entity }) if entity == "Room"));

        let result = service
            .create_booking(
                &guest("ghost"),
                &NewBooking::new("x", "h1", "2030-01-05", "2030-01-10"),
            )
            .await;
        assert!(matches!(result, Err(BookingError::NotFound { ref entity }) if entity == "User"));
    }

    #[tokio::test]
    async fn test_get_booking_enforces_ownership() {
        let service = BookingService::new(seeded_store().await);
        let booking = service
            .create_booking(
                &guest("guest-1"),
                &NewBooking::new("x", "h1", "2030-01-05", "2030-01-10"),
            )
            .await
            .unwrap();

        assert!(service.get_booking(&guest("guest-1"), &booking.id).await.is_ok());
        assert!(matches!(
            service.get_booking(&guest("guest-2"), &booking.id).await,
            Err(BookingError::Forbidden)
        ));
        let admin = Principal::new("root", Role::Admin);
        assert!(service.get_booking(&admin, &booking.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let service = BookingService::new(seeded_store().await);
        let booking = service
            .create_booking(
                &guest("guest-1"),
                &NewBooking::new("x", "h1", "2030-01-05", "2030-01-10"),
            )
            .await
            .unwrap();

        // After check-in day
        let late = Utc.with_ymd_and_hms(2030, 1, 6, 0, 0, 0).unwrap();
        let result = service
            .cancel_booking_at(&guest("guest-1"), &booking.id, late)
            .await;
        assert!(matches!(result, Err(BookingError::Validation { .. })));

        // Someone else's booking
        let early = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let result = service
            .cancel_booking_at(&guest("guest-2"), &booking.id, early)
            .await;
        assert!(matches!(result, Err(BookingError::Forbidden)));

        // Check-in day itself is still allowed
        let same_day = Utc.with_ymd_and_hms(2030, 1, 5, 18, 0, 0).unwrap();
        let cancelled = service
            .cancel_booking_at(&guest("guest-1"), &booking.id, same_day)
            .await
            .unwrap();
        assert!(cancelled.is_cancelled());

        let again = service
            .cancel_booking_at(&guest("guest-1"), &booking.id, same_day)
            .await;
        assert!(matches!(again, Err(BookingError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_owner_and_user_listings() {
        let service = BookingService::new(seeded_store().await);
        service
            .create_booking(
                &guest("guest-1"),
                &NewBooking::new("x", "h1", "2030-01-05", "2030-01-10"),
            )
            .await
            .unwrap();
        service
            .create_booking(
                &guest("guest-2"),
                &NewBooking::new("x", "h1", "2030-01-10", "2030-01-12"),
            )
            .await
            .unwrap();

        assert_eq!(service.list_bookings(&guest("guest-1")).await.unwrap().len(), 1);
        let owner = Principal::new("owner-1", Role::Owner);
        assert_eq!(service.owner_bookings(&owner).await.unwrap().len(), 2);
    }
}
