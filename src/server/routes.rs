//! Route handlers

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::ApiError;
use super::state::{AppState, AuthUser};
use crate::app::cache::{HotelSearchQuery, RouteQuery};
use crate::app::models::Role;
use crate::app::{HotelReview, NewBooking, NewHotel, NewRoom};
use crate::constants::cache_durations;

type ApiResult<T> = std::result::Result<T, ApiError>;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cacheBackend": state.cache.store().backend_name(),
    }))
}

// Bookings

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(inner)| inner).map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::bad_request("Invalid request body")
    })
}

pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    payload: std::result::Result<Json<NewBooking>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = json_body(payload)?;
    let booking = state.bookings.create_booking(&principal, &request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

pub async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let bookings = state.bookings.list_bookings(&principal).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

pub async fn owner_bookings_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Owner)?;
    let bookings = state.bookings.owner_bookings(&principal).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

pub async fn get_booking_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.get_booking(&principal, &id).await?;
    Ok(Json(json!({ "booking": booking })))
}

pub async fn cancel_booking_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.cancel_booking(&principal, &id).await?;
    Ok(Json(json!({
        "message": "Booking cancelled successfully",
        "booking": booking,
    })))
}

// Listings

pub async fn create_hotel_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    payload: std::result::Result<Json<NewHotel>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Owner)?;
    let request = json_body(payload)?;
    let hotel = state.catalog.create_hotel(&principal, &request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "hotel": hotel }))))
}

pub async fn get_hotel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let hotel = state.catalog.get_hotel(&id).await?;
    Ok(Json(json!({ "hotel": hotel })))
}

pub async fn review_hotel_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<HotelReview>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let review = json_body(payload)?;
    let hotel = state.catalog.review_hotel(&principal, &id, &review).await?;
    Ok(Json(json!({
        "message": format!("Hotel {} successfully", hotel.status.as_str()),
        "hotel": hotel,
    })))
}

pub async fn pending_hotels_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let hotels = state.catalog.pending_hotels().await?;
    Ok(Json(json!({ "hotels": hotels })))
}

pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    payload: std::result::Result<Json<NewRoom>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Owner)?;
    let request = json_body(payload)?;
    let room = state.catalog.create_room(&principal, &request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "room": room }))))
}

// Search

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchParams {
    pub destination: Option<String>,
    /// Comma-separated facility names
    pub facilities: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl From<HotelSearchParams> for HotelSearchQuery {
    fn from(params: HotelSearchParams) -> Self {
        let facilities = params
            .facilities
            .map(|list| list.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        HotelSearchQuery {
            destination: params.destination,
            facilities,
            min_price: params.min_price,
            max_price: params.max_price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteSearchParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
}

impl From<RouteSearchParams> for RouteQuery {
    fn from(params: RouteSearchParams) -> Self {
        RouteQuery::new(
            params.from.unwrap_or_default(),
            params.to.unwrap_or_default(),
            params.date,
        )
    }
}

fn query_params<T>(params: std::result::Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params.map(|Query(inner)| inner).map_err(|e| {
        debug!("Rejected query string: {}", e);
        ApiError::bad_request("Invalid query parameters")
    })
}

pub async fn hotel_search_handler(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<HotelSearchParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let query = HotelSearchQuery::from(query_params(params)?);
    let results = state.search.search_hotels(&query).await?;
    Ok(Json(results))
}

pub async fn bus_search_handler(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<RouteSearchParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let query = RouteQuery::from(query_params(params)?);
    let results = state.search.search_buses(&query).await?;
    Ok(Json(results))
}

pub async fn flight_search_handler(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<RouteSearchParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let query = RouteQuery::from(query_params(params)?);
    let results = state.search.search_flights(&query).await?;
    Ok(Json(results))
}

// Cache administration

#[derive(Debug, Deserialize)]
pub struct CacheKeyParams {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCacheBody {
    pub key: Option<String>,
    pub value: Option<Value>,
    /// Expiry in seconds; absent means no expiry
    pub ttl: Option<u64>,
}

fn required_key(key: Option<String>) -> ApiResult<String> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Cache key is required"))
}

pub async fn get_cache_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    params: std::result::Result<Query<CacheKeyParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let key = required_key(query_params(params)?.key)?;

    let raw = state
        .cache
        .store()
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cache miss".to_string()))?;

    // Values written outside this API may not be JSON
    let data = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
    Ok(Json(json!({ "data": data, "cached": true })))
}

pub async fn set_cache_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    payload: std::result::Result<Json<SetCacheBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let body = json_body(payload)?;

    let key = required_key(body.key)?;
    let value = body
        .value
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::bad_request("Key and value are required"))?;

    let max_ttl = cache_durations::MAX.as_secs();
    if body.ttl.is_some_and(|secs| secs > max_ttl) {
        return Err(ApiError::bad_request(format!("ttl must not exceed {max_ttl} seconds")));
    }

    let payload = value.to_string();
    let ttl = body.ttl.filter(|secs| *secs > 0).map(Duration::from_secs);
    state.cache.store().set(&key, &payload, ttl).await?;

    info!("Admin {} set cache key {}", principal.uid, key);
    Ok(Json(json!({ "success": true, "key": key })))
}

pub async fn delete_cache_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    params: std::result::Result<Query<CacheKeyParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let key = required_key(query_params(params)?.key)?;

    let removed = state.cache.store().delete(&key).await?;
    info!("Admin {} deleted cache key {} (present: {})", principal.uid, key, removed);
    Ok(Json(json!({ "success": true, "key": key, "removed": removed })))
}

pub async fn cache_stats_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    principal.require_role(Role::Admin)?;
    let stats = state.cache.stats();
    Ok(Json(json!({
        "backend": state.cache.store().backend_name(),
        "stats": stats,
        "hitRate": stats.hit_rate(),
    })))
}
