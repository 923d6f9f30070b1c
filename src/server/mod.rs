//! HTTP API
//!
//! An axum router over [`AppState`]. Booking routes need a bearer token and
//! search routes are public. Listing writes need the owner role; listing
//! review and cache administration need the admin role.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /health` | liveness and cache backend |
//! | `POST/GET /api/bookings` | create, list own |
//! | `GET /api/bookings/owner` | bookings on the caller's hotels |
//! | `GET/DELETE /api/bookings/{id}` | fetch, cancel |
//! | `POST /api/hotels` | list a hotel (owner) |
//! | `GET /api/hotels/{id}` | cached hotel record |
//! | `PATCH /api/hotels/{id}/status` | approve or reject (admin) |
//! | `GET /api/admin/hotels/pending` | hotels awaiting review (admin) |
//! | `POST /api/rooms` | add a room to an own hotel (owner) |
//! | `GET /api/hotels/search` | cached hotel search |
//! | `GET /api/buses/search` | cached bus search |
//! | `GET /api/flights/search` | cached flight search |
//! | `GET/POST/DELETE /api/cache` | key administration |
//! | `GET /api/cache/stats` | hit/miss counters |

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::constants::server;
use crate::errors::Result;

pub use error::ApiError;
pub use state::{AppState, AuthUser};

use routes::{
    bus_search_handler, cache_stats_handler, cancel_booking_handler, create_booking_handler,
    create_hotel_handler, create_room_handler, delete_cache_handler, flight_search_handler,
    get_booking_handler, get_cache_handler, get_hotel_handler, health_handler,
    hotel_search_handler, list_bookings_handler, owner_bookings_handler, pending_hotels_handler,
    review_hotel_handler, set_cache_handler,
};

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/bookings",
            get(list_bookings_handler).post(create_booking_handler),
        )
        .route("/api/bookings/owner", get(owner_bookings_handler))
        .route(
            "/api/bookings/{id}",
            get(get_booking_handler).delete(cancel_booking_handler),
        )
        .route("/api/hotels", post(create_hotel_handler))
        .route("/api/hotels/search", get(hotel_search_handler))
        .route("/api/hotels/{id}", get(get_hotel_handler))
        .route("/api/hotels/{id}/status", patch(review_hotel_handler))
        .route("/api/admin/hotels/pending", get(pending_hotels_handler))
        .route("/api/rooms", post(create_room_handler))
        .route("/api/buses/search", get(bus_search_handler))
        .route("/api/flights/search", get(flight_search_handler))
        .route(
            "/api/cache",
            get(get_cache_handler)
                .post(set_cache_handler)
                .delete(delete_cache_handler),
        )
        .route("/api/cache/stats", get(cache_stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured origins; empty allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(server::CORS_MAX_AGE);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, cors_origins: &[String]) -> Result<()> {
    let app = router(state).layer(cors_layer(cors_origins));

    info!("Binding to {addr}");
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
