//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use wayfare::app::models::{ApprovalStatus, Bus, Hotel, Role, Room, UserProfile};
use wayfare::app::MemoryStore;
use wayfare::auth::{StaticTokenVerifier, TokenEntry};

pub const GUEST: &str = "guest-1";
pub const OTHER_GUEST: &str = "guest-2";
pub const OWNER: &str = "owner-1";
pub const ADMIN: &str = "admin-1";

pub const ROOM: &str = "room-1";
pub const HOTEL: &str = "hotel-1";

/// Store with one approved hotel, one room at 2500/night, a bus and users
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    for (id, name, role) in [
        (GUEST, "Asha", Role::User),
        (OTHER_GUEST, "Ben", Role::User),
        (OWNER, "Olivia", Role::Owner),
        (ADMIN, "Root", Role::Admin),
    ] {
        store
            .insert_user(UserProfile {
                id: id.to_string(),
                name: name.to_string(),
                email: format!("{}@example.com", id),
                role,
            })
            .await
            .unwrap();
    }

    store
        .insert_hotel(Hotel {
            id: HOTEL.to_string(),
            name: "Sea View Resort".to_string(),
            location: "Goa".to_string(),
            facilities: vec!["Pool".to_string(), "WiFi".to_string()],
            cover_image: "https://img.example.com/sea-view.jpg".to_string(),
            owner_id: OWNER.to_string(),
            status: ApprovalStatus::Approved,
        })
        .await
        .unwrap();

    store
        .insert_room(Room {
            id: ROOM.to_string(),
            hotel_id: HOTEL.to_string(),
            title: "Deluxe Double".to_string(),
            price: 2500.0,
            capacity: 2,
        })
        .await
        .unwrap();

    store
        .insert_bus(Bus {
            id: "bus-1".to_string(),
            operator: "Konkan Travels".to_string(),
            depart: "Mumbai".to_string(),
            arrive: "Goa".to_string(),
            departure_time: "21:00".to_string(),
            arrival_time: "08:00".to_string(),
            price: 1200.0,
        })
        .await
        .unwrap();

    store
}

/// Token table where each token is `<uid>-token`
pub fn verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::from_entries([
        token_entry(GUEST, Role::User),
        token_entry(OTHER_GUEST, Role::User),
        token_entry(OWNER, Role::Owner),
        token_entry(ADMIN, Role::Admin),
    ])
}

pub fn token_for(uid: &str) -> String {
    format!("{}-token", uid)
}

fn token_entry(uid: &str, role: Role) -> TokenEntry {
    TokenEntry {
        token: token_for(uid),
        uid: uid.to_string(),
        email: None,
        role,
    }
}
