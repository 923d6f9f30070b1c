//! Room availability checking
//!
//! A room is available for a stay when no confirmed reservation on it
//! intersects the stay's half-open day interval. Intervals are compared at UTC
//! day granularity, so a guest checking out on the 12th and another checking
//! in on the 12th do not collide.
//!
//! The check is a plain scan over the room's confirmed reservations; per-room
//! cardinality is small enough that no interval index is kept.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error};

use crate::app::models::{Reservation, StayRange};
use crate::app::store::DocumentStore;
use crate::errors::BookingResult;

/// Half-open intersection of two `(start, end)` day spans
pub fn spans_overlap(
    candidate: (NaiveDate, NaiveDate),
    existing: (NaiveDate, NaiveDate),
) -> bool {
    candidate.0 < existing.1 && candidate.1 > existing.0
}

/// First confirmed reservation in `reservations` that overlaps `stay`
pub fn first_conflict<'a, I>(stay: &StayRange, reservations: I) -> Option<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let candidate = (stay.start(), stay.end());
    reservations
        .into_iter()
        .filter(|r| r.is_confirmed())
        .find(|r| spans_overlap(candidate, r.day_span()))
}

/// Read-only overlap checks against the document store
#[derive(Debug, Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn DocumentStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Whether any confirmed reservation on `room_id` overlaps `[from, to)`
    ///
    /// Both instants are truncated to their UTC day before comparison.
    ///
    /// # Errors
    ///
    /// `BookingError::Validation` if `to` is not at least one day after `from`;
    /// `BookingError::StorageUnavailable` if the reservations cannot be read.
    /// Callers must treat the latter as "unknown" and not proceed to book.
    pub async fn is_overlapping(
        &self,
        room_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BookingResult<bool> {
        let stay = StayRange::from_instants(from, to)?;
        self.is_stay_overlapping(room_id, &stay).await
    }

    /// Same as [`Self::is_overlapping`] for an already validated range
    pub async fn is_stay_overlapping(
        &self,
        room_id: &str,
        stay: &StayRange,
    ) -> BookingResult<bool> {
        let existing = self
            .store
            .confirmed_reservations_for_room(room_id)
            .await
            .map_err(|e| {
                error!("Failed to load reservations for room {}: {}", room_id, e);
                e
            })?;

        let conflict = first_conflict(stay, &existing);
        if let Some(found) = conflict {
            debug!(
                "Room {} unavailable {}..{}: overlaps reservation {}",
                room_id,
                stay.start(),
                stay.end(),
                found.id
            );
        }

        Ok(conflict.is_some())
    }
}
