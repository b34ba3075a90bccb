//! API Routes
//!
//! Configures the Axum router with all aggregation server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_flush_handler, cache_stats_handler, health_handler, list_pokemon_handler,
    pokemon_by_type_handler, pokemon_detail_handler, AppState,
};
use crate::upstream::Upstream;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/v1/pokemon` - Paged, name-filterable listing
/// - `GET /api/v1/pokemon/type/:type_name` - Listing by type
/// - `GET /api/v1/pokemon/:name` - Single pokemon detail
/// - `GET /api/v1/cache` - Cache statistics
/// - `DELETE /api/v1/cache` - Flush the cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<U: Upstream + 'static>(state: AppState<U>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/api/v1/pokemon", get(list_pokemon_handler::<U>))
        .route(
            "/api/v1/pokemon/type/:type_name",
            get(pokemon_by_type_handler::<U>),
        )
        .route("/api/v1/pokemon/:name", get(pokemon_detail_handler::<U>))
        .route(
            "/api/v1/cache",
            get(cache_stats_handler::<U>).delete(cache_flush_handler::<U>),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
