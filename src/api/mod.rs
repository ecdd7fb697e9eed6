//! Axum HTTP surface over the cost engine and stores.

pub mod error;
pub mod routes;

use axum::Router;
use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::core::currency::{CurrencyRateProvider, RatePolicy};
use crate::store::{CorridorStore, TransferHistory};

/// Everything a handler needs, injected at router construction. No
/// module-level globals; tests build one of these around in-memory
/// stores and a stub rate provider.
#[derive(Clone)]
pub struct AppState {
    pub corridors: Arc<dyn CorridorStore>,
    pub history: Arc<dyn TransferHistory>,
    pub rates: Arc<dyn CurrencyRateProvider>,
    pub rate_policy: RatePolicy,
}

/// Assemble the application router: API routes, CORS for the frontend
/// origins, and request tracing.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
