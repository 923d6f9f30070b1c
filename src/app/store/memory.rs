//! In-process document store with optional JSON snapshot persistence
//!
//! All collections live behind one `RwLock`. Every write takes the write lock,
//! mutates, persists the snapshot (when a path is configured) and only then
//! releases the lock, so the overlap re-check and the insert of a reservation
//! cannot interleave with another writer.
//!
//! Snapshots are written with the temp-file + rename pattern so a crash never
//! leaves a half-written file behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::app::availability::spans_overlap;
use crate::app::models::{ApprovalStatus, Bus, Flight, Hotel, Reservation, Room, UserProfile};
use crate::constants::files;
use crate::errors::{StoreError, StoreResult};

use super::{CancelOutcome, DocumentStore, InsertOutcome};

/// Serialized form of every collection, keyed by document id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: BTreeMap<String, UserProfile>,
    pub hotels: BTreeMap<String, Hotel>,
    pub rooms: BTreeMap<String, Room>,
    pub bookings: BTreeMap<String, Reservation>,
    pub buses: BTreeMap<String, Bus>,
    pub flights: BTreeMap<String, Flight>,
}

impl Snapshot {
    /// Decode a snapshot from JSON text
    pub fn from_json(content: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Memory-backed [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store that never touches disk
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `snapshot`, without persistence
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            snapshot_path: None,
        }
    }

    /// Open a store backed by the snapshot file at `path`
    ///
    /// A missing file yields an empty store; the file is created on first write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or decoded
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let snapshot = if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
            let snapshot = Snapshot::from_json(&content)?;
            info!(
                "Loaded store snapshot from {} ({} hotels, {} rooms, {} bookings)",
                path.display(),
                snapshot.hotels.len(),
                snapshot.rooms.len(),
                snapshot.bookings.len()
            );
            snapshot
        } else {
            debug!("No snapshot at {}, starting empty", path.display());
            Snapshot::default()
        };

        Ok(Self {
            data: RwLock::new(snapshot),
            snapshot_path: Some(path),
        })
    }

    /// Path of the backing snapshot file, if any
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    pub async fn insert_user(&self, user: UserProfile) -> StoreResult<()> {
        self.mutate(|data| {
            data.users.insert(user.id.clone(), user);
        })
        .await
    }

    pub async fn insert_hotel(&self, hotel: Hotel) -> StoreResult<()> {
        self.mutate(|data| {
            data.hotels.insert(hotel.id.clone(), hotel);
        })
        .await
    }

    pub async fn insert_room(&self, room: Room) -> StoreResult<()> {
        self.mutate(|data| {
            data.rooms.insert(room.id.clone(), room);
        })
        .await
    }

    pub async fn insert_bus(&self, bus: Bus) -> StoreResult<()> {
        self.mutate(|data| {
            data.buses.insert(bus.id.clone(), bus);
        })
        .await
    }

    pub async fn insert_flight(&self, flight: Flight) -> StoreResult<()> {
        self.mutate(|data| {
            data.flights.insert(flight.id.clone(), flight);
        })
        .await
    }

    /// Apply a mutation and persist it, rolling back if persistence fails
    async fn mutate<F, R>(&self, apply: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Snapshot) -> R,
    {
        let mut data = self.data.write().await;
        let previous = self.snapshot_path.as_ref().map(|_| data.clone());

        let applied = apply(&mut data);

        if let Err(e) = self.persist(&data).await {
            if let Some(previous) = previous {
                *data = previous;
            }
            return Err(e);
        }
        Ok(applied)
    }

    /// Write the snapshot atomically using temp file + rename
    async fn persist(&self, data: &Snapshot) -> StoreResult<()> {
        let Some(final_path) = &self.snapshot_path else {
            return Ok(());
        };

        let temp_path = final_path.with_extension(format!(
            "{}{}",
            final_path.extension().unwrap_or_default().to_string_lossy(),
            files::TEMP_FILE_SUFFIX
        ));

        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StoreError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let content = serde_json::to_vec_pretty(data)?;

        fs::write(&temp_path, content).await.map_err(|source| {
            error!("Failed to write temporary snapshot: {}", source);
            StoreError::Io {
                path: temp_path.clone(),
                source,
            }
        })?;

        fs::rename(&temp_path, final_path).await.map_err(|source| {
            error!("Failed to rename temporary snapshot: {}", source);
            StoreError::Io {
                path: final_path.clone(),
                source,
            }
        })?;

        debug!("Persisted store snapshot to {}", final_path.display());
        Ok(())
    }
}

fn newest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reservations
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_room(&self, room_id: &str) -> StoreResult<Option<Room>> {
        Ok(self.data.read().await.rooms.get(room_id).cloned())
    }

    async fn get_hotel(&self, hotel_id: &str) -> StoreResult<Option<Hotel>> {
        Ok(self.data.read().await.hotels.get(hotel_id).cloned())
    }

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.data.read().await.users.get(user_id).cloned())
    }

    async fn rooms_for_hotel(&self, hotel_id: &str) -> StoreResult<Vec<Room>> {
        let data = self.data.read().await;
        Ok(data
            .rooms
            .values()
            .filter(|room| room.hotel_id == hotel_id)
            .cloned()
            .collect())
    }

    async fn hotels_with_status(&self, status: ApprovalStatus) -> StoreResult<Vec<Hotel>> {
        let data = self.data.read().await;
        Ok(data
            .hotels
            .values()
            .filter(|hotel| hotel.status == status)
            .cloned()
            .collect())
    }

    async fn create_hotel(&self, hotel: Hotel) -> StoreResult<()> {
        self.insert_hotel(hotel).await
    }

    async fn create_room(&self, room: Room) -> StoreResult<()> {
        self.insert_room(room).await
    }

    async fn set_hotel_status(
        &self,
        hotel_id: &str,
        status: ApprovalStatus,
    ) -> StoreResult<Option<Hotel>> {
        self.mutate(|data| {
            data.hotels.get_mut(hotel_id).map(|hotel| {
                hotel.status = status;
                hotel.clone()
            })
        })
        .await
    }

    async fn buses(&self) -> StoreResult<Vec<Bus>> {
        Ok(self.data.read().await.buses.values().cloned().collect())
    }

    async fn flights(&self) -> StoreResult<Vec<Flight>> {
        Ok(self.data.read().await.flights.values().cloned().collect())
    }

    async fn confirmed_reservations_for_room(
        &self,
        room_id: &str,
    ) -> StoreResult<Vec<Reservation>> {
        let data = self.data.read().await;
        Ok(data
            .bookings
            .values()
            .filter(|r| r.room_id == room_id && r.is_confirmed())
            .cloned()
            .collect())
    }

    async fn insert_reservation_if_available(
        &self,
        reservation: Reservation,
    ) -> StoreResult<InsertOutcome> {
        let mut data = self.data.write().await;

        let candidate = reservation.day_span();
        let conflict = data
            .bookings
            .values()
            .filter(|r| r.room_id == reservation.room_id && r.is_confirmed())
            .find(|r| spans_overlap(candidate, r.day_span()));

        if let Some(existing) = conflict {
            debug!(
                "Rejected reservation for room {}: overlaps {}",
                reservation.room_id, existing.id
            );
            return Ok(InsertOutcome::Conflict {
                existing_id: existing.id.clone(),
            });
        }

        data.bookings.insert(reservation.id.clone(), reservation.clone());

        if let Err(e) = self.persist(&data).await {
            data.bookings.remove(&reservation.id);
            return Err(e);
        }

        debug!(
            "Stored reservation {} for room {}",
            reservation.id, reservation.room_id
        );
        Ok(InsertOutcome::Inserted(reservation))
    }

    async fn get_reservation(&self, reservation_id: &str) -> StoreResult<Option<Reservation>> {
        Ok(self.data.read().await.bookings.get(reservation_id).cloned())
    }

    async fn cancel_reservation(
        &self,
        reservation_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<CancelOutcome> {
        let mut data = self.data.write().await;

        let Some(reservation) = data.bookings.get_mut(reservation_id) else {
            return Ok(CancelOutcome::NotFound);
        };

        let before = reservation.clone();
        if !reservation.cancel(at) {
            return Ok(CancelOutcome::AlreadyCancelled);
        }
        let cancelled = reservation.clone();

        if let Err(e) = self.persist(&data).await {
            data.bookings.insert(before.id.clone(), before);
            return Err(e);
        }

        Ok(CancelOutcome::Cancelled(cancelled))
    }

    async fn reservations_for_user(&self, user_id: &str) -> StoreResult<Vec<Reservation>> {
        let data = self.data.read().await;
        let found = data
            .bookings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(found))
    }

    async fn reservations_for_owner(&self, owner_id: &str) -> StoreResult<Vec<Reservation>> {
        let data = self.data.read().await;
        let found = data
            .bookings
            .values()
            .filter(|r| r.hotel_owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(found))
    }
}
