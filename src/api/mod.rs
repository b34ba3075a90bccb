//! API Module
//!
//! HTTP handlers and routing for the aggregation server REST API.
//!
//! # Endpoints
//! - `GET /api/v1/pokemon` - Paged, name-filterable listing
//! - `GET /api/v1/pokemon/type/:type_name` - Listing by type
//! - `GET /api/v1/pokemon/:name` - Single pokemon detail
//! - `GET /api/v1/cache` - Cache statistics
//! - `DELETE /api/v1/cache` - Flush the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
