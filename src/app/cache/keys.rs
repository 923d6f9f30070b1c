//! Cache key generation
//!
//! Keys are namespaced by entity (`hotel:`, `bus:`, `flight:`). Search keys
//! embed the JSON encoding of the normalized query, so requests that differ
//! only in casing, surrounding whitespace or facility order share an entry and
//! distinct queries never collide.

use serde::{Deserialize, Serialize};

use crate::constants::cache_keys;
use crate::errors::CacheResult;

/// Hotel search parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

impl HotelSearchQuery {
    /// Lowercased, trimmed, deduplicated and sorted copy of the query
    pub fn normalized(&self) -> Self {
        let destination = self
            .destination
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty());

        let mut facilities: Vec<String> = self
            .facilities
            .iter()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();
        facilities.sort();
        facilities.dedup();

        Self {
            destination,
            facilities,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

/// Origin/destination/date query shared by bus and flight search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl RouteQuery {
    pub fn new(from: impl Into<String>, to: impl Into<String>, date: Option<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            date,
        }
    }

    pub fn normalized(&self) -> Self {
        Self {
            from: self.from.trim().to_lowercase(),
            to: self.to.trim().to_lowercase(),
            date: self
                .date
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }
}

/// `hotel:{id}`
pub fn hotel(hotel_id: &str) -> String {
    format!("{}:{}", cache_keys::HOTEL, hotel_id)
}

/// `hotel:search:{json}` over the normalized query
pub fn hotel_search(query: &HotelSearchQuery) -> CacheResult<String> {
    namespaced(cache_keys::HOTEL_SEARCH, &query.normalized())
}

/// `bus:search:{json}` over the normalized query
pub fn bus_search(query: &RouteQuery) -> CacheResult<String> {
    namespaced(cache_keys::BUS_SEARCH, &query.normalized())
}

/// `flight:search:{json}` over the normalized query
pub fn flight_search(query: &RouteQuery) -> CacheResult<String> {
    namespaced(cache_keys::FLIGHT_SEARCH, &query.normalized())
}

/// `{prefix}:{json}`; struct field order is fixed, so the encoding is deterministic
fn namespaced<T: Serialize>(prefix: &str, query: &T) -> CacheResult<String> {
    Ok(format!("{}:{}", prefix, serde_json::to_string(query)?))
}
