//! HTTP flight search provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, warn};
use url::Url;

use super::config::ClientConfig;
use super::FlightProvider;
use crate::app::cache::RouteQuery;
use crate::app::models::Flight;
use crate::constants::http;
use crate::errors::{ProviderError, ProviderResult};

/// Provider response envelope
#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightOffer {
    id: String,
    carrier_code: String,
    #[serde(default)]
    number: String,
    origin: String,
    destination: String,
    #[serde(default)]
    departure_at: String,
    #[serde(default)]
    arrival_at: String,
    price: OfferPrice,
}

/// Providers quote totals as decimal strings
#[derive(Debug, Deserialize)]
struct OfferPrice {
    total: String,
}

impl FlightOffer {
    fn into_flight(self) -> Option<Flight> {
        let price = match self.price.total.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            _ => {
                warn!("Skipping offer {} with unusable price {:?}", self.id, self.price.total);
                return None;
            }
        };

        let airline = if self.number.is_empty() {
            self.carrier_code
        } else {
            format!("{} {}", self.carrier_code, self.number)
        };

        Some(Flight {
            id: self.id,
            airline,
            depart: self.origin,
            arrive: self.destination,
            departure_time: self.departure_at,
            arrival_time: self.arrival_at,
            price,
        })
    }
}

/// [`FlightProvider`] that queries a JSON offers endpoint
///
/// Issues `GET {base_url}/flights?from=&to=&date=` with the API key header.
#[derive(Debug, Clone)]
pub struct HttpFlightProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpFlightProvider {
    /// Build a provider from `config`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotConfigured` without a base URL and API key,
    /// `ProviderError::InvalidUrl` for an unparseable base URL, or
    /// `ProviderError::Http` if the client cannot be built
    pub fn new(config: &ClientConfig) -> ProviderResult<Self> {
        let (Some(base_url), Some(api_key)) = (&config.base_url, &config.api_key) else {
            return Err(ProviderError::NotConfigured {
                reason: "base_url and api_key are required".to_string(),
            });
        };
        if !config.is_configured() {
            return Err(ProviderError::NotConfigured {
                reason: "base_url and api_key must not be empty".to_string(),
            });
        }

        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("flights")?;

        Ok(Self {
            client: config.build_http_client()?,
            endpoint,
            api_key: api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &RouteQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("from", &query.from);
            pairs.append_pair("to", &query.to);
            if let Some(date) = &query.date {
                pairs.append_pair("date", date);
            }
        }
        url
    }
}

#[async_trait]
impl FlightProvider for HttpFlightProvider {
    async fn search(&self, query: &RouteQuery) -> ProviderResult<Vec<Flight>> {
        let url = self.request_url(query);
        debug!("Querying flight provider: {}", url);

        let response = self
            .client
            .get(url)
            .header(http::API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Flight provider returned HTTP {}", status);
            return Err(ProviderError::BadStatus {
                status: status.as_u16(),
            });
        }

        let offers: OffersResponse = response.json().await?;
        let flights: Vec<Flight> = offers
            .data
            .into_iter()
            .filter_map(FlightOffer::into_flight)
            .collect();

        debug!("Flight provider returned {} offers", flights.len());
        Ok(flights)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    use super::*;

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    async fn offers(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("secret") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let from = params.get("from").cloned().unwrap_or_default();
        let to = params.get("to").cloned().unwrap_or_default();
        Ok(Json(json!({
            "data": [
                {
                    "id": "offer-1",
                    "carrierCode": "6E",
                    "number": "554",
                    "origin": from,
                    "destination": to,
                    "departureAt": "2025-03-10T10:00:00",
                    "arrivalAt": "2025-03-10T12:30:00",
                    "price": { "total": "5420" }
                },
                {
                    "id": "offer-2",
                    "carrierCode": "UK",
                    "origin": from,
                    "destination": to,
                    "price": { "total": "n/a" }
                }
            ]
        })))
    }

    #[test]
    fn test_requires_configuration() {
        let result = HttpFlightProvider::new(&ClientConfig::default());
        assert!(matches!(result, Err(ProviderError::NotConfigured { .. })));

        let result = HttpFlightProvider::new(&ClientConfig::new("not a url", "key"));
        assert!(matches!(result, Err(ProviderError::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let provider =
            HttpFlightProvider::new(&ClientConfig::new("https://api.example.com/v2", "key"))
                .unwrap();
        assert_eq!(
            provider.endpoint().as_str(),
            "https://api.example.com/v2/flights"
        );

        let query = RouteQuery::new("DEL", "BOM", Some("2025-03-10".to_string()));
        assert_eq!(
            provider.request_url(&query).as_str(),
            "https://api.example.com/v2/flights?from=DEL&to=BOM&date=2025-03-10"
        );
    }

    #[tokio::test]
    async fn test_search_maps_offers() {
        let base = spawn_provider(Router::new().route("/v1/flights", get(offers))).await;
        let provider = HttpFlightProvider::new(&ClientConfig::new(base, "secret")).unwrap();

        let flights = provider
            .search(&RouteQuery::new("DEL", "BOM", None))
            .await
            .unwrap();

        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].airline, "6E 554");
        assert_eq!(flights[0].depart, "DEL");
        assert_eq!(flights[0].arrive, "BOM");
        assert_eq!(flights[0].price, 5420.0);
    }

    #[tokio::test]
    async fn test_search_surfaces_bad_status() {
        let base = spawn_provider(Router::new().route("/v1/flights", get(offers))).await;
        let provider = HttpFlightProvider::new(&ClientConfig::new(base, "wrong")).unwrap();

        let result = provider.search(&RouteQuery::new("DEL", "BOM", None)).await;
        assert!(matches!(
            result,
            Err(ProviderError::BadStatus { status: 401 })
        ));
    }
}
