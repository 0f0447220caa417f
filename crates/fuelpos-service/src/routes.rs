//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{fuel, health, sales};
use crate::state::AppState;

/// Maximum concurrent requests for the API routes.
const API_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Fuel inventory (admin auth)
/// - `GET /v1/fuel` - List fuel types
/// - `POST /v1/fuel` - Add a fuel type
/// - `GET /v1/fuel/:id` - Get a fuel type
/// - `PUT /v1/fuel/:id` - Update price and/or stock
/// - `DELETE /v1/fuel/:id` - Remove a fuel type
///
/// ## Sales (admin auth)
/// - `POST /v1/sales` - Record a sale
/// - `GET /v1/sales?limit=` - List recent sales
/// - `GET /v1/sales/:id` - Get a sale
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/fuel", get(fuel::list_fuels).post(fuel::create_fuel))
        .route(
            "/fuel/:id",
            get(fuel::get_fuel)
                .put(fuel::update_fuel)
                .delete(fuel::delete_fuel),
        )
        .route(
            "/sales",
            get(sales::list_recent_sales).post(sales::record_sale),
        )
        .route("/sales/:id", get(sales::get_sale))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
