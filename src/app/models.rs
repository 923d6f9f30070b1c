//! Data models for the booking and search domains
//!
//! Records are serialized with camelCase field names so snapshots and API
//! payloads keep the document shape clients already know (`roomId`,
//! `fromDate`, ...). All instants are UTC; day granularity is derived by
//! truncating to the UTC calendar date.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::catalog;
use crate::errors::{BookingError, BookingResult};

/// Lifecycle status of a reservation
///
/// `Confirmed -> Cancelled` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

/// User role claim carried by identity tokens and user profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }
}

/// Hotel listing approval state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Half-open range of UTC calendar days `[start, end)`
///
/// Construction guarantees `end > start`, so every range covers at least one
/// night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayRange {
    /// Build a range from calendar days
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Validation` if `end` is not after `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> BookingResult<Self> {
        if end <= start {
            return Err(BookingError::validation(
                "Booking must be for at least one night",
            ));
        }
        Ok(Self { start, end })
    }

    /// Build a range from two instants, discarding time-of-day
    pub fn from_instants(from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Self> {
        Self::new(truncate_to_day(from), truncate_to_day(to))
    }

    /// Parse both endpoints (RFC 3339 instant or `YYYY-MM-DD`) and build a range
    pub fn parse(from: &str, to: &str) -> BookingResult<Self> {
        let from = parse_instant(from)
            .ok_or_else(|| BookingError::validation(format!("Invalid fromDate: {from}")))?;
        let to = parse_instant(to)
            .ok_or_else(|| BookingError::validation(format!("Invalid toDate: {to}")))?;
        Self::from_instants(from, to)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights covered
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Check-in instant (UTC midnight of the first day)
    pub fn start_instant(&self) -> DateTime<Utc> {
        start_of_day(self.start)
    }

    /// Check-out instant (UTC midnight of the departure day)
    pub fn end_instant(&self) -> DateTime<Utc> {
        start_of_day(self.end)
    }

    /// Half-open intersection test; touching endpoints do not overlap
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Truncate an instant to its UTC calendar day
pub fn truncate_to_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// UTC midnight at the start of `day`
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date (taken as UTC midnight)
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}

/// A room reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    pub hotel_id: String,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub total_price: f64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hotel_name: String,
    #[serde(default)]
    pub hotel_location: String,
    #[serde(default)]
    pub room_title: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub hotel_owner_id: String,
}

impl Reservation {
    /// Stored interval truncated to UTC days, as `(start, end)`
    ///
    /// Not a [`StayRange`]: stored records are compared as-is even if an older
    /// writer left them empty.
    pub fn day_span(&self) -> (NaiveDate, NaiveDate) {
        (truncate_to_day(self.from_date), truncate_to_day(self.to_date))
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }

    /// Flip to cancelled. Returns `false` if it already was.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.status = ReservationStatus::Cancelled;
        self.cancelled_at = Some(at);
        true
    }
}

/// Bookable room with a nightly rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub title: String,
    pub price: f64,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    catalog::DEFAULT_ROOM_CAPACITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub cover_image: String,
    pub owner_id: String,
    #[serde(default)]
    pub status: ApprovalStatus,
}

impl Hotel {
    /// Case-insensitive substring match on name or location
    pub fn matches_destination(&self, destination: &str) -> bool {
        let needle = destination.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.location.to_lowercase().contains(&needle)
    }

    /// Whether the hotel offers every listed facility
    pub fn has_facilities(&self, facilities: &[String]) -> bool {
        facilities
            .iter()
            .all(|wanted| self.facilities.iter().any(|f| f.eq_ignore_ascii_case(wanted)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Scheduled bus service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: String,
    pub operator: String,
    pub depart: String,
    pub arrive: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    pub price: f64,
}

/// Scheduled flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub depart: String,
    pub arrive: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    pub price: f64,
}

/// Case-insensitive route match used by bus and flight search
pub fn route_matches(depart: &str, arrive: &str, from: &str, to: &str) -> bool {
    depart.to_lowercase().contains(&from.to_lowercase())
        && arrive.to_lowercase().contains(&to.to_lowercase())
}
