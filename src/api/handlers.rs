//! API Handlers
//!
//! HTTP request handlers for each aggregation server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{AggregatorError, Result};
use crate::fetch::BatchFetcher;
use crate::models::{
    FlushResponse, HealthResponse, ListQuery, ListResponse, PokemonDetail, StatsResponse,
};
use crate::service::PokemonService;
use crate::upstream::{PokeApiClient, Upstream};

/// Application state shared across all handlers.
///
/// The cache store is injected explicitly and shared with the service and
/// the background tasks; there is no global mutable state.
pub struct AppState<U> {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Aggregation service over the injected upstream client
    pub service: Arc<PokemonService<U>>,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            service: self.service.clone(),
        }
    }
}

impl<U: Upstream + 'static> AppState<U> {
    /// Creates a new AppState over a store and an upstream client.
    pub fn new(cache: CacheStore, upstream: U, batcher: BatchFetcher) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let service = Arc::new(PokemonService::new(
            cache.clone(),
            Arc::new(upstream),
            batcher,
        ));
        Self { cache, service }
    }
}

impl AppState<PokeApiClient> {
    /// Creates a new AppState from configuration, wiring the real PokeAPI
    /// client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = PokeApiClient::new(
            &config.upstream_base_url,
            Duration::from_secs(config.upstream_timeout),
        )?;
        let store = CacheStore::new(config.max_entries, config.default_ttl);
        let batcher = BatchFetcher::new(
            config.batch_size,
            Duration::from_millis(config.batch_delay_ms),
        );
        Ok(Self::new(store, client, batcher))
    }
}

/// Handler for GET /api/v1/pokemon
///
/// Returns one enriched listing page, filtered by the optional name query.
pub async fn list_pokemon_handler<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(AggregatorError::InvalidRequest(error_msg));
    }

    let results = state.service.get_pokemon_list(&query).await?;
    Ok(Json(ListResponse::new(results)))
}

/// Handler for GET /api/v1/pokemon/:name
pub async fn pokemon_detail_handler<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
    Path(name): Path<String>,
) -> Result<Json<PokemonDetail>> {
    let detail = state.service.get_pokemon_by_name(&name).await?;
    Ok(Json(detail))
}

/// Handler for GET /api/v1/pokemon/type/:type_name
pub async fn pokemon_by_type_handler<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
    Path(type_name): Path<String>,
) -> Result<Json<ListResponse>> {
    let results = state.service.get_pokemon_by_type(&type_name).await?;
    Ok(Json(ListResponse::new(results)))
}

/// Handler for GET /api/v1/cache
///
/// Returns current cache statistics.
pub async fn cache_stats_handler<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for DELETE /api/v1/cache
///
/// Removes all entries and resets statistics.
pub async fn cache_flush_handler<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
) -> Json<FlushResponse> {
    let mut cache = state.cache.write().await;
    cache.flush();
    Json(FlushResponse::new())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
