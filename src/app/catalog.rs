//! Hotel and room listings
//!
//! Owners list hotels and add rooms to them; new hotels start out pending and
//! only show up in search once an admin approves them. Single hotel records
//! are served through the cache under [`keys::hotel`] and dropped from it
//! whenever their status changes. Search results that already include a hotel
//! are not touched and age out on their own TTL.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::cache::{keys, SearchCache};
use crate::app::models::{ApprovalStatus, Hotel, Room};
use crate::app::store::DocumentStore;
use crate::auth::Principal;
use crate::constants::{cache_durations, catalog};
use crate::errors::{CatalogError, CatalogResult};

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Hotel listing request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHotel {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    pub cover_image: Option<String>,
}

impl NewHotel {
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            location: Some(location.to_string()),
            ..Self::default()
        }
    }
}

/// Room request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub hotel_id: Option<String>,
    pub title: Option<String>,
    /// Nightly rate; must be positive
    pub price: Option<f64>,
    pub capacity: Option<u32>,
}

impl NewRoom {
    pub fn new(hotel_id: &str, title: &str, price: f64) -> Self {
        Self {
            hotel_id: Some(hotel_id.to_string()),
            title: Some(title.to_string()),
            price: Some(price),
            capacity: None,
        }
    }
}

/// Admin decision on a pending hotel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HotelReview {
    pub status: Option<String>,
}

impl HotelReview {
    pub fn new(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
        }
    }

    /// Only `approved` and `rejected` are decisions
    fn decision(&self) -> CatalogResult<ApprovalStatus> {
        match self.status.as_deref().map(str::trim) {
            Some("approved") => Ok(ApprovalStatus::Approved),
            Some("rejected") => Ok(ApprovalStatus::Rejected),
            _ => Err(CatalogError::validation(
                "Invalid status. Must be \"approved\" or \"rejected\"",
            )),
        }
    }
}

/// Listing operations over a shared document store
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    cache: SearchCache,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: SearchCache) -> Self {
        Self { store, cache }
    }

    /// List a new hotel owned by `owner`, pending approval
    ///
    /// # Errors
    ///
    /// - `Validation` if the name or location is missing
    /// - `NotFound` if the owner has no user profile
    /// - `Storage` if the store fails
    pub async fn create_hotel(
        &self,
        owner: &Principal,
        request: &NewHotel,
    ) -> CatalogResult<Hotel> {
        let (Some(name), Some(location)) = (present(&request.name), present(&request.location))
        else {
            return Err(CatalogError::validation(
                "Missing required hotel information",
            ));
        };

        if self.store.get_user(&owner.uid).await?.is_none() {
            return Err(CatalogError::not_found("User"));
        }

        let hotel = Hotel {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: location.to_string(),
            facilities: request
                .facilities
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            cover_image: present(&request.cover_image)
                .unwrap_or(catalog::DEFAULT_COVER_IMAGE)
                .to_string(),
            owner_id: owner.uid.clone(),
            status: ApprovalStatus::Pending,
        };

        self.store.create_hotel(hotel.clone()).await?;
        info!("Owner {} listed hotel {} ({})", owner.uid, hotel.id, hotel.name);
        Ok(hotel)
    }

    /// Add a room to one of `owner`'s hotels
    ///
    /// # Errors
    ///
    /// - `Validation` if the hotel id or title is missing or the price is not
    ///   positive
    /// - `NotFound` if the hotel does not exist
    /// - `Forbidden` if the hotel belongs to someone else
    pub async fn create_room(&self, owner: &Principal, request: &NewRoom) -> CatalogResult<Room> {
        let price = request.price.filter(|p| p.is_finite() && *p > 0.0);
        let (Some(hotel_id), Some(title), Some(price)) =
            (present(&request.hotel_id), present(&request.title), price)
        else {
            return Err(CatalogError::validation(
                "Missing required room information",
            ));
        };

        let hotel = self
            .store
            .get_hotel(hotel_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Hotel"))?;

        if hotel.owner_id != owner.uid {
            return Err(CatalogError::Forbidden {
                reason: "You can only add rooms to your own hotels".to_string(),
            });
        }

        let room = Room {
            id: Uuid::new_v4().to_string(),
            hotel_id: hotel.id,
            title: title.to_string(),
            price,
            capacity: request.capacity.unwrap_or(catalog::DEFAULT_ROOM_CAPACITY),
        };

        self.store.create_room(room.clone()).await?;
        info!(
            "Owner {} added room {} to hotel {} at {:.2}/night",
            owner.uid, room.id, room.hotel_id, room.price
        );
        Ok(room)
    }

    /// Fetch one hotel, whatever its status
    pub async fn get_hotel(&self, hotel_id: &str) -> CatalogResult<Hotel> {
        let store = Arc::clone(&self.store);
        let id = hotel_id.to_string();
        self.cache
            .cached_search(&keys::hotel(hotel_id), cache_durations::LONG, move || async move {
                let hotel = store.get_hotel(&id).await?;
                hotel.ok_or_else(|| CatalogError::not_found("Hotel"))
            })
            .await
    }

    /// Approve or reject a hotel listing
    ///
    /// # Errors
    ///
    /// - `Validation` unless the status is `approved` or `rejected`
    /// - `NotFound` if the hotel does not exist
    pub async fn review_hotel(
        &self,
        reviewer: &Principal,
        hotel_id: &str,
        review: &HotelReview,
    ) -> CatalogResult<Hotel> {
        let status = review.decision()?;

        let hotel = self
            .store
            .set_hotel_status(hotel_id, status)
            .await?
            .ok_or_else(|| CatalogError::not_found("Hotel"))?;

        self.cache.invalidate(&keys::hotel(hotel_id)).await;
        info!("Admin {} marked hotel {} {}", reviewer.uid, hotel_id, status.as_str());
        Ok(hotel)
    }

    /// Hotels waiting for an admin decision
    pub async fn pending_hotels(&self) -> CatalogResult<Vec<Hotel>> {
        Ok(self.store.hotels_with_status(ApprovalStatus::Pending).await?)
    }
}
