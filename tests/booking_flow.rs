//! End-to-end booking scenarios against the in-memory store

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use wayfare::app::{BookingService, DocumentStore, MemoryStore, NewBooking, ReservationStatus};
use wayfare::auth::Principal;
use wayfare::errors::BookingError;

use common::{seeded_store, GUEST, HOTEL, OTHER_GUEST, ROOM};
use wayfare::app::models::Role;

fn guest() -> Principal {
    Principal::new(GUEST, Role::User)
}

fn other_guest() -> Principal {
    Principal::new(OTHER_GUEST, Role::User)
}

#[tokio::test]
async fn test_overlapping_request_is_rejected_and_turnover_is_accepted() {
    let store = seeded_store().await;
    let service = BookingService::new(store.clone());

    let first = service
        .create_booking(&guest(), &NewBooking::new(ROOM, HOTEL, "2030-01-05", "2030-01-10"))
        .await
        .unwrap();
    assert_eq!(first.status, ReservationStatus::Confirmed);
    assert_eq!(first.total_price, 2500.0 * 5.0);

    let overlapping = service
        .create_booking(
            &other_guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-01-08", "2030-01-12"),
        )
        .await;
    assert!(matches!(overlapping, Err(BookingError::Conflict { .. })));
    assert_eq!(
        store.confirmed_reservations_for_room(ROOM).await.unwrap().len(),
        1
    );

    let turnover = service
        .create_booking(
            &other_guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-01-10", "2030-01-15"),
        )
        .await
        .unwrap();
    assert_eq!(turnover.status, ReservationStatus::Confirmed);
    assert_eq!(
        store.confirmed_reservations_for_room(ROOM).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_time_of_day_does_not_matter() {
    let store = seeded_store().await;
    let service = BookingService::new(store.clone());

    service
        .create_booking(
            &guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-03-10T22:00:00Z", "2030-03-12T09:00:00Z"),
        )
        .await
        .unwrap();

    // Same nights, different clock times
    let clash = service
        .create_booking(
            &other_guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-03-11T01:00:00Z", "2030-03-12T23:59:00Z"),
        )
        .await;
    assert!(matches!(clash, Err(BookingError::Conflict { .. })));

    let checker = service.availability();
    let from = Utc.with_ymd_and_hms(2030, 3, 12, 15, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2030, 3, 14, 11, 0, 0).unwrap();
    assert!(!checker.is_overlapping(ROOM, from, to).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_creates_yield_one_reservation() {
    let store = seeded_store().await;
    let service = Arc::new(BookingService::new(store.clone()));

    let mut handles = Vec::new();
    for uid in [GUEST, OTHER_GUEST, GUEST, OTHER_GUEST, GUEST, OTHER_GUEST] {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .create_booking(
                    &Principal::new(uid, Role::User),
                    &NewBooking::new(ROOM, HOTEL, "2030-06-01", "2030-06-04"),
                )
                .await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(BookingError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 5);
    assert_eq!(
        store.confirmed_reservations_for_room(ROOM).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_cancellation_frees_the_nights() {
    let store = seeded_store().await;
    let service = BookingService::new(store.clone());
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();

    let booking = service
        .create_booking(&guest(), &NewBooking::new(ROOM, HOTEL, "2030-02-01", "2030-02-03"))
        .await
        .unwrap();

    // Someone else may not cancel it
    let foreign = service
        .cancel_booking_at(&other_guest(), &booking.id, now)
        .await;
    assert!(matches!(foreign, Err(BookingError::Forbidden)));

    let cancelled = service
        .cancel_booking_at(&guest(), &booking.id, now)
        .await
        .unwrap();
    assert!(cancelled.is_cancelled());
    assert!(cancelled.cancelled_at.is_some());

    let again = service.cancel_booking_at(&guest(), &booking.id, now).await;
    assert!(matches!(again, Err(BookingError::Conflict { .. })));

    // Cancelled reservations do not block the room
    service
        .create_booking(
            &other_guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-02-01", "2030-02-03"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancellation_after_check_in_is_refused() {
    let store = seeded_store().await;
    let service = BookingService::new(store);

    let booking = service
        .create_booking(&guest(), &NewBooking::new(ROOM, HOTEL, "2030-04-01", "2030-04-05"))
        .await
        .unwrap();

    let later = Utc.with_ymd_and_hms(2030, 4, 2, 8, 0, 0).unwrap();
    let result = service.cancel_booking_at(&guest(), &booking.id, later).await;
    assert!(matches!(result, Err(BookingError::Validation { .. })));
}

#[tokio::test]
async fn test_unknown_entities_and_bad_input() {
    let store = seeded_store().await;
    let service = BookingService::new(store.clone());

    let missing_room = service
        .create_booking(
            &guest(),
            &NewBooking::new("room-404", HOTEL, "2030-05-01", "2030-05-02"),
        )
        .await;
    assert!(matches!(missing_room, Err(BookingError::NotFound { .. })));

    let empty_stay = service
        .create_booking(&guest(), &NewBooking::new(ROOM, HOTEL, "2030-05-01", "2030-05-01"))
        .await;
    assert!(matches!(empty_stay, Err(BookingError::Validation { .. })));

    let missing_field = service
        .create_booking(
            &guest(),
            &NewBooking {
                room_id: Some(ROOM.to_string()),
                ..NewBooking::default()
            },
        )
        .await;
    assert!(matches!(missing_field, Err(BookingError::Validation { .. })));

    let unknown_user = service
        .create_booking(
            &Principal::new("ghost", Role::User),
            &NewBooking::new(ROOM, HOTEL, "2030-05-01", "2030-05-02"),
        )
        .await;
    assert!(matches!(unknown_user, Err(BookingError::NotFound { .. })));

    assert!(store
        .confirmed_reservations_for_room(ROOM)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reservations_survive_reopening_the_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");

    let booking_id = {
        let store = Arc::new(MemoryStore::open(&path).await.unwrap());
        let seed = seeded_store().await.snapshot().await;
        for user in seed.users.into_values() {
            store.insert_user(user).await.unwrap();
        }
        for hotel in seed.hotels.into_values() {
            store.insert_hotel(hotel).await.unwrap();
        }
        for room in seed.rooms.into_values() {
            store.insert_room(room).await.unwrap();
        }

        let service = BookingService::new(store);
        service
            .create_booking(&guest(), &NewBooking::new(ROOM, HOTEL, "2030-07-01", "2030-07-03"))
            .await
            .unwrap()
            .id
    };

    assert!(path.exists());

    let reopened = Arc::new(MemoryStore::open(&path).await.unwrap());
    let service = BookingService::new(reopened);

    let fetched = service.get_booking(&guest(), &booking_id).await.unwrap();
    assert_eq!(fetched.room_id, ROOM);

    let clash = service
        .create_booking(
            &other_guest(),
            &NewBooking::new(ROOM, HOTEL, "2030-07-02", "2030-07-04"),
        )
        .await;
    assert!(matches!(clash, Err(BookingError::Conflict { .. })));
}
