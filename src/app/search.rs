//! Hotel, bus and flight search over the cache-aside layer
//!
//! Every search is read-only. Results are cached under keys built from the
//! normalized query, so a repeated search within the TTL never reaches the
//! store or the provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::app::cache::{keys, CacheConfig, HotelSearchQuery, RouteQuery, SearchCache};
use crate::app::client::FlightProvider;
use crate::app::models::{route_matches, Bus, Flight, Hotel};
use crate::app::store::DocumentStore;
use crate::errors::{CacheResult, SearchError, SearchResult};

/// Hotel search response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelResults {
    pub hotels: Vec<Hotel>,
}

/// Bus search response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusResults {
    pub buses: Vec<Bus>,
}

/// Flight search response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightResults {
    pub flights: Vec<Flight>,
}

/// TTLs applied by [`SearchService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTtls {
    /// Third-party provider results
    pub provider: Duration,
    /// Results computed from the document store
    pub internal: Duration,
}

impl Default for SearchTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for SearchTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            provider: config.short_ttl,
            internal: config.medium_ttl,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    cache: SearchCache,
    flights: Option<Arc<dyn FlightProvider>>,
    ttls: SearchTtls,
}

impl SearchService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: SearchCache) -> Self {
        Self {
            store,
            cache,
            flights: None,
            ttls: SearchTtls::default(),
        }
    }

    /// Serve flight search from `provider` instead of the store
    pub fn with_flight_provider(mut self, provider: Arc<dyn FlightProvider>) -> Self {
        self.flights = Some(provider);
        self
    }

    pub fn with_ttls(mut self, ttls: SearchTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Approved hotels matching destination, facilities and nightly price bounds
    ///
    /// A hotel passes the price filter when at least one of its rooms is priced
    /// within `[min_price, max_price]`.
    pub async fn search_hotels(&self, query: &HotelSearchQuery) -> SearchResult<HotelResults> {
        let query = query.normalized();
        validate_price_bounds(&query)?;

        let key = keys::hotel_search(&query);
        self.through_cache(key, self.ttls.internal, move || self.load_hotels(query))
            .await
    }

    async fn load_hotels(&self, query: HotelSearchQuery) -> SearchResult<HotelResults> {
        let mut hotels = self.store.approved_hotels().await.map_err(|e| {
            error!("Hotel search failed to load hotels: {}", e);
            SearchError::from(e)
        })?;

        if let Some(destination) = &query.destination {
            hotels.retain(|hotel| hotel.matches_destination(destination));
        }
        if !query.facilities.is_empty() {
            hotels.retain(|hotel| hotel.has_facilities(&query.facilities));
        }

        if query.min_price.is_some() || query.max_price.is_some() {
            let min = query.min_price.unwrap_or(0.0);
            let max = query.max_price.unwrap_or(f64::INFINITY);
            let mut priced = Vec::with_capacity(hotels.len());
            for hotel in hotels {
                let rooms = self.store.rooms_for_hotel(&hotel.id).await?;
                if rooms.iter().any(|room| room.price >= min && room.price <= max) {
                    priced.push(hotel);
                }
            }
            hotels = priced;
        }

        debug!("Hotel search matched {} hotels", hotels.len());
        Ok(HotelResults { hotels })
    }

    /// Buses whose route contains `from` and `to` (case-insensitive)
    ///
    /// The date only partitions the cache; listings are not filtered by it.
    pub async fn search_buses(&self, query: &RouteQuery) -> SearchResult<BusResults> {
        let query = query.normalized();
        validate_route(&query)?;

        let key = keys::bus_search(&query);
        self.through_cache(key, self.ttls.internal, move || async move {
            let buses = self
                .store
                .buses()
                .await?
                .into_iter()
                .filter(|bus| route_matches(&bus.depart, &bus.arrive, &query.from, &query.to))
                .collect::<Vec<_>>();
            debug!("Bus search matched {} buses", buses.len());
            Ok::<_, SearchError>(BusResults { buses })
        })
        .await
    }

    /// Flights from the configured provider, or from the store without one
    pub async fn search_flights(&self, query: &RouteQuery) -> SearchResult<FlightResults> {
        let query = query.normalized();
        validate_route(&query)?;

        let key = keys::flight_search(&query);
        match &self.flights {
            Some(provider) => {
                self.through_cache(key, self.ttls.provider, move || async move {
                    let flights = provider.search(&query).await.map_err(|e| {
                        error!("Flight provider {} failed: {}", provider.name(), e);
                        SearchError::from(e)
                    })?;
                    Ok::<_, SearchError>(FlightResults { flights })
                })
                .await
            }
            None => {
                self.through_cache(key, self.ttls.internal, move || async move {
                    let flights = self
                        .store
                        .flights()
                        .await?
                        .into_iter()
                        .filter(|flight| {
                            route_matches(&flight.depart, &flight.arrive, &query.from, &query.to)
                        })
                        .collect();
                    Ok::<_, SearchError>(FlightResults { flights })
                })
                .await
            }
        }
    }

    /// Run `compute` through the cache, or directly when no key could be built
    async fn through_cache<T, F, Fut>(
        &self,
        key: CacheResult<String>,
        ttl: Duration,
        compute: F,
    ) -> SearchResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = SearchResult<T>>,
    {
        match key {
            Ok(key) => self.cache.cached_search(&key, ttl, compute).await,
            Err(e) => {
                warn!("Could not build cache key, searching uncached: {}", e);
                compute().await
            }
        }
    }
}

fn validate_route(query: &RouteQuery) -> SearchResult<()> {
    if query.from.trim().is_empty() || query.to.trim().is_empty() {
        return Err(SearchError::Validation {
            reason: "from and to parameters are required".to_string(),
        });
    }
    Ok(())
}

fn validate_price_bounds(query: &HotelSearchQuery) -> SearchResult<()> {
    let invalid = |value: Option<f64>| value.is_some_and(|v| !v.is_finite() || v < 0.0);
    if invalid(query.min_price) || invalid(query.max_price) {
        return Err(SearchError::Validation {
            reason: "Price bounds must be non-negative numbers".to_string(),
        });
    }
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(SearchError::Validation {
                reason: "minPrice must not exceed maxPrice".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::app::models::{ApprovalStatus, Room};
    use crate::app::store::MemoryStore;
    use crate::errors::{ProviderError, ProviderResult};

    fn hotel(id: &str, name: &str, location: &str, facilities: &[&str]) -> Hotel {
        Hotel {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            facilities: facilities.iter().map(|f| f.to_string()).collect(),
            cover_image: String::new(),
            owner_id: "owner-1".to_string(),
            status: ApprovalStatus::Approved,
        }
    }

    fn room(id: &str, hotel_id: &str, price: f64) -> Room {
        Room {
            id: id.to_string(),
            hotel_id: hotel_id.to_string(),
            title: "Deluxe".to_string(),
            price,
            capacity: 2,
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_hotel(hotel("h1", "Sea View", "Goa", &["Pool", "WiFi"]))
            .await
            .unwrap();
        store
            .insert_hotel(hotel("h2", "Hill Top", "Manali", &["WiFi"]))
            .await
            .unwrap();
        let mut pending = hotel("h3", "Goa Nest", "Goa", &["Pool"]);
        pending.status = ApprovalStatus::Pending;
        store.insert_hotel(pending).await.unwrap();

        store.insert_room(room("r1", "h1", 4000.0)).await.unwrap();
        store.insert_room(room("r2", "h2", 1500.0)).await.unwrap();
        store
            .insert_bus(Bus {
                id: "b1".to_string(),
                operator: "Volvo Express".to_string(),
                depart: "Delhi".to_string(),
                arrive: "Agra".to_string(),
                departure_time: "07:00".to_string(),
                arrival_time: "11:00".to_string(),
                price: 650.0,
            })
            .await
            .unwrap();
        store
            .insert_flight(Flight {
                id: "f1".to_string(),
                airline: "IndiGo".to_string(),
                depart: "Delhi (DEL)".to_string(),
                arrive: "Mumbai (BOM)".to_string(),
                departure_time: "10:00".to_string(),
                arrival_time: "12:10".to_string(),
                price: 5400.0,
            })
            .await
            .unwrap();
        store
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl FlightProvider for CountingProvider {
        async fn search(&self, query: &RouteQuery) -> ProviderResult<Vec<Flight>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::BadStatus { status: 503 });
            }
            Ok(vec![Flight {
                id: "live-1".to_string(),
                airline: "UK 887".to_string(),
                depart: query.from.clone(),
                arrive: query.to.clone(),
                departure_time: String::new(),
                arrival_time: String::new(),
                price: 6800.0,
            }])
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_hotel_search_filters_and_caches() {
        let store = seeded_store().await;
        let service = SearchService::new(store.clone(), SearchCache::in_memory());

        let query = HotelSearchQuery {
            destination: Some("goa".to_string()),
            facilities: vec!["pool".to_string()],
            ..Default::default()
        };
        let results = service.search_hotels(&query).await.unwrap();
        let ids: Vec<_> = results.hotels.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["h1"]);

        // A new approved hotel stays invisible until the entry expires
        store
            .insert_hotel(hotel("h4", "Goa Palms", "Goa", &["Pool"]))
            .await
            .unwrap();
        let cached = service.search_hotels(&query).await.unwrap();
        assert_eq!(cached, results);
        assert_eq!(service.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_hotel_search_price_bounds() {
        let service = SearchService::new(seeded_store().await, SearchCache::in_memory());

        let budget = HotelSearchQuery {
            max_price: Some(2000.0),
            ..Default::default()
        };
        let results = service.search_hotels(&budget).await.unwrap();
        let ids: Vec<_> = results.hotels.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["h2"]);

        let inverted = HotelSearchQuery {
            min_price: Some(500.0),
            max_price: Some(100.0),
            ..Default::default()
        };
        assert!(matches!(
            service.search_hotels(&inverted).await,
            Err(SearchError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_bus_search_requires_route() {
        let service = SearchService::new(seeded_store().await, SearchCache::in_memory());

        let missing = RouteQuery::new("Delhi", "", None);
        assert!(matches!(
            service.search_buses(&missing).await,
            Err(SearchError::Validation { .. })
        ));

        let results = service
            .search_buses(&RouteQuery::new("delhi", "agra", None))
            .await
            .unwrap();
        assert_eq!(results.buses.len(), 1);
        assert_eq!(results.buses[0].id, "b1");
    }

    #[tokio::test]
    async fn test_flight_search_falls_back_to_store() {
        let service = SearchService::new(seeded_store().await, SearchCache::in_memory());

        let results = service
            .search_flights(&RouteQuery::new("DEL", "BOM", None))
            .await
            .unwrap();
        assert_eq!(results.flights.len(), 1);
        assert_eq!(results.flights[0].id, "f1");
    }

    #[tokio::test]
    async fn test_flight_search_uses_provider_once_per_ttl() {
        let provider = Arc::new(CountingProvider::default());
        let service = SearchService::new(seeded_store().await, SearchCache::in_memory())
            .with_flight_provider(provider.clone());

        let query = RouteQuery::new("DEL", "BOM", Some("2025-03-10".to_string()));
        let first = service.search_flights(&query).await.unwrap();
        let second = service.search_flights(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.flights[0].id, "live-1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_cached() {
        let provider = Arc::new(CountingProvider {
            fail: true,
            ..Default::default()
        });
        let service = SearchService::new(seeded_store().await, SearchCache::in_memory())
            .with_flight_provider(provider.clone());

        let query = RouteQuery::new("DEL", "BOM", None);
        assert!(matches!(
            service.search_flights(&query).await,
            Err(SearchError::Provider(_))
        ));
        assert!(service.search_flights(&query).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
