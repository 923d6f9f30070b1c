//! Outbound clients for third-party search providers
//!
//! The module is organized into:
//! - `config`: HTTP client configuration and building
//! - `flights`: JSON flight offers provider
//!
//! Search code depends only on the [`FlightProvider`] trait, so tests and
//! deployments without a provider key can swap the HTTP implementation out.

use async_trait::async_trait;

use crate::app::cache::RouteQuery;
use crate::app::models::Flight;
use crate::errors::ProviderResult;

pub mod config;
pub mod flights;

pub use config::ClientConfig;
pub use flights::HttpFlightProvider;

/// Source of live flight offers
#[async_trait]
pub trait FlightProvider: Send + Sync + std::fmt::Debug {
    /// Offers matching the route and optional date
    async fn search(&self, query: &RouteQuery) -> ProviderResult<Vec<Flight>>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
