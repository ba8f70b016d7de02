//! API Routes
//!
//! Configures the Axum router with all inventory endpoints.

use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    car_handler, clear_cache_handler, filters_handler, health_handler, inventory_handler,
    search_handler, send_sms_handler, stats_handler, table_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/inventory` - Merged inventory, feed-side filters
/// - `GET /api/inventory/search` - Filtered and sorted inventory
/// - `GET /api/inventory/table` - Searchable, paginated inventory
/// - `GET /api/inventory/car/:vin` - Single vehicle
/// - `GET /api/filters` - Facet values for the filter UI
/// - `ANY /api/clear-cache` - Drop both caches
/// - `POST /api/send-sms` - Log a sent tour link
/// - `GET /api/stats` - Cache counters
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/inventory", get(inventory_handler))
        .route("/api/inventory/search", get(search_handler))
        .route("/api/inventory/table", get(table_handler))
        .route("/api/inventory/car/:vin", get(car_handler))
        .route("/api/filters", get(filters_handler))
        .route("/api/clear-cache", any(clear_cache_handler))
        .route("/api/send-sms", post(send_sms_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
