//! Integration Tests for the Aggregation Service and API
//!
//! Drives full list/detail/by-type flows through a scripted mock upstream,
//! covering cache population, coalescing, batch failure isolation, and the
//! HTTP surface.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use pokedex_cache::api::{create_router, AppState};
use pokedex_cache::cache::CacheStore;
use pokedex_cache::error::{AggregatorError, Result};
use pokedex_cache::fetch::BatchFetcher;
use pokedex_cache::models::ListQuery;
use pokedex_cache::upstream::Upstream;

// == Mock Upstream ==

#[derive(Default)]
struct MockInner {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, AggregatorError>>,
    calls: Mutex<Vec<String>>,
    latency: Mutex<Duration>,
}

/// Scripted upstream: path -> canned body or canned failure. Unknown paths
/// answer 404 like the real API. Every call is recorded.
#[derive(Clone, Default)]
struct MockUpstream {
    inner: Arc<MockInner>,
}

impl MockUpstream {
    fn new() -> Self {
        Self::default()
    }

    fn respond(&self, path: &str, body: Value) -> &Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
        self
    }

    fn fail(&self, path: &str, error: AggregatorError) -> &Self {
        self.inner
            .failures
            .lock()
            .unwrap()
            .insert(path.to_string(), error);
        self
    }

    fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap() = latency;
    }

    fn call_count(&self, path: &str) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    fn total_calls(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn get(&self, path: &str) -> Result<Value> {
        self.inner.calls.lock().unwrap().push(path.to_string());

        let latency = *self.inner.latency.lock().unwrap();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.inner.failures.lock().unwrap().get(path) {
            return Err(error.clone());
        }

        match self.inner.responses.lock().unwrap().get(path) {
            Some(body) => Ok(body.clone()),
            None => Err(AggregatorError::UpstreamStatus {
                status: 404,
                path: path.to_string(),
            }),
        }
    }
}

// == Fixtures ==

fn listing_body(names: &[&str]) -> Value {
    json!({
        "count": names.len(),
        "results": names
            .iter()
            .map(|name| json!({
                "name": name,
                "url": format!("https://pokeapi.co/api/v2/pokemon/{name}/")
            }))
            .collect::<Vec<_>>()
    })
}

fn pokemon_body(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "height": 4,
        "weight": 60,
        "sprites": {
            "front_default": format!("https://img/{id}.png"),
            "other": { "official-artwork": { "front_default": format!("https://art/{id}.png") } }
        },
        "types": [ { "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } } ],
        "abilities": [ { "ability": { "name": "static", "url": "u" }, "is_hidden": false } ],
        "stats": [ { "base_stat": 35, "stat": { "name": "hp", "url": "u" } } ]
    })
}

fn species_body(chain_id: u32) -> Value {
    json!({
        "evolution_chain": {
            "url": format!("https://pokeapi.co/api/v2/evolution-chain/{chain_id}/")
        }
    })
}

/// pichu -> pikachu -> raichu
fn chain_body() -> Value {
    json!({
        "chain": {
            "species": { "name": "pichu", "url": "https://pokeapi.co/api/v2/pokemon-species/172/" },
            "evolves_to": [ {
                "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" },
                "evolves_to": [ {
                    "species": { "name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon-species/26/" },
                    "evolves_to": []
                } ]
            } ]
        }
    })
}

fn test_state(upstream: MockUpstream) -> AppState<MockUpstream> {
    AppState::new(
        CacheStore::new(1000, 300),
        upstream,
        BatchFetcher::new(10, Duration::from_millis(0)),
    )
}

fn seed_three_pokemon(upstream: &MockUpstream) {
    upstream.respond(
        "pokemon?limit=20&offset=0",
        listing_body(&["pikachu", "raichu", "eevee"]),
    );
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.respond("pokemon/raichu", pokemon_body(26, "raichu"));
    upstream.respond("pokemon/eevee", pokemon_body(133, "eevee"));
}

// == List Flow ==

#[tokio::test]
async fn test_list_populates_aggregate_and_detail_namespaces() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let state = test_state(upstream.clone());

    let results = state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].name, "pikachu");
    assert_eq!(results[0].image_url.as_deref(), Some("https://art/25.png"));

    // The page and every enriched item are cached individually
    let mut cache = state.cache.write().await;
    assert!(cache.has("pokemon:list:0_20_all"));
    assert!(cache.has("pokemon:detail:pikachu"));
    assert!(cache.has("pokemon:detail:raichu"));
    assert!(cache.has("pokemon:detail:eevee"));
}

#[tokio::test]
async fn test_repeat_list_request_is_served_from_cache() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let state = test_state(upstream.clone());

    state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();
    let calls_after_first = upstream.total_calls();

    let results = state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(upstream.total_calls(), calls_after_first);
}

#[tokio::test]
async fn test_name_filter_is_reapplied_to_cached_page() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let state = test_state(upstream.clone());

    let query = ListQuery {
        name: Some("chu".to_string()),
        ..Default::default()
    };

    let first = state.service.get_pokemon_list(&query).await.unwrap();
    assert_eq!(first.len(), 2);

    // The cached page holds the full unfiltered content
    let cached = state
        .cache
        .write()
        .await
        .get("pokemon:list:0_20_chu")
        .unwrap();
    assert_eq!(cached.as_array().unwrap().len(), 3);

    // The hit path filters again and issues no upstream calls
    let calls_before = upstream.total_calls();
    let second = state.service.get_pokemon_list(&query).await.unwrap();
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|p| p.name.contains("chu")));
    assert_eq!(upstream.total_calls(), calls_before);
}

#[tokio::test]
async fn test_failed_items_are_omitted_without_failing_the_listing() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    upstream.fail(
        "pokemon/raichu",
        AggregatorError::UpstreamStatus {
            status: 500,
            path: "pokemon/raichu".to_string(),
        },
    );
    let state = test_state(upstream);

    let results = state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();

    let names: Vec<&str> = results.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["pikachu", "eevee"]);
}

#[tokio::test]
async fn test_concurrent_list_requests_coalesce_to_one_fetch() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    upstream.set_latency(Duration::from_millis(30));
    let state = test_state(upstream.clone());

    let query = ListQuery::default();
    let (a, b) = tokio::join!(
        state.service.get_pokemon_list(&query),
        state.service.get_pokemon_list(&query),
    );

    assert_eq!(a.unwrap().len(), 3);
    assert_eq!(b.unwrap().len(), 3);
    assert_eq!(upstream.call_count("pokemon?limit=20&offset=0"), 1);
}

#[tokio::test]
async fn test_list_enrichment_reuses_cached_details() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let state = test_state(upstream.clone());

    state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();

    // A fresh page listing the same names hits the detail namespace
    upstream.respond(
        "pokemon?limit=2&offset=0",
        listing_body(&["pikachu", "raichu"]),
    );
    let query = ListQuery {
        limit: 2,
        ..Default::default()
    };
    state.service.get_pokemon_list(&query).await.unwrap();

    assert_eq!(upstream.call_count("pokemon/pikachu"), 1);
    assert_eq!(upstream.call_count("pokemon/raichu"), 1);
}

// == Detail Flow ==

#[tokio::test]
async fn test_detail_returns_evolution_chain_in_traversal_order() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.respond("pokemon-species/pikachu", species_body(10));
    upstream.respond("evolution-chain/10/", chain_body());
    let state = test_state(upstream.clone());

    let detail = state.service.get_pokemon_by_name("Pikachu").await.unwrap();

    assert_eq!(detail.id, 25);
    let chain: Vec<(&str, u32)> = detail
        .evolution_chain
        .iter()
        .map(|link| (link.name.as_str(), link.id))
        .collect();
    assert_eq!(chain, vec![("pichu", 172), ("pikachu", 25), ("raichu", 26)]);

    // Served from cache afterwards
    let calls_before = upstream.total_calls();
    let cached = state.service.get_pokemon_by_name("pikachu").await.unwrap();
    assert_eq!(cached, detail);
    assert_eq!(upstream.total_calls(), calls_before);
}

#[tokio::test]
async fn test_species_failure_degrades_to_empty_chain() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.fail(
        "pokemon-species/pikachu",
        AggregatorError::UpstreamUnreachable {
            path: "pokemon-species/pikachu".to_string(),
            reason: "timed out".to_string(),
        },
    );
    let state = test_state(upstream);

    let detail = state.service.get_pokemon_by_name("pikachu").await.unwrap();

    assert_eq!(detail.name, "pikachu");
    assert!(detail.evolution_chain.is_empty());
}

#[tokio::test]
async fn test_chain_fetch_failure_degrades_to_empty_chain() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.respond("pokemon-species/pikachu", species_body(10));
    upstream.fail(
        "evolution-chain/10/",
        AggregatorError::UpstreamStatus {
            status: 500,
            path: "evolution-chain/10/".to_string(),
        },
    );
    let state = test_state(upstream);

    let detail = state.service.get_pokemon_by_name("pikachu").await.unwrap();
    assert!(detail.evolution_chain.is_empty());
}

#[tokio::test]
async fn test_primary_failure_fails_the_detail_request() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon-species/missingno", species_body(10));
    let state = test_state(upstream);

    let result = state.service.get_pokemon_by_name("missingno").await;
    assert!(matches!(
        result,
        Err(AggregatorError::UpstreamStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_cached_summary_does_not_satisfy_a_detail_read() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    upstream.respond("pokemon-species/pikachu", species_body(10));
    upstream.respond("evolution-chain/10/", chain_body());
    let state = test_state(upstream.clone());

    // List enrichment writes a summary under pokemon:detail:pikachu
    state
        .service
        .get_pokemon_list(&ListQuery::default())
        .await
        .unwrap();
    assert_eq!(upstream.call_count("pokemon/pikachu"), 1);

    // The summary is a forced miss for the detail read; a fresh fetch
    // overwrites the entry with the full object
    let detail = state.service.get_pokemon_by_name("pikachu").await.unwrap();
    assert_eq!(upstream.call_count("pokemon/pikachu"), 2);
    assert_eq!(detail.evolution_chain.len(), 3);
    assert_eq!(detail.stats.len(), 1);
}

// == By-Type Flow ==

#[tokio::test]
async fn test_by_type_listing_is_enriched_and_cached() {
    let upstream = MockUpstream::new();
    upstream.respond(
        "type/electric",
        json!({
            "pokemon": [
                { "pokemon": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon/25/" }, "slot": 1 },
                { "pokemon": { "name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon/26/" }, "slot": 1 }
            ]
        }),
    );
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.respond("pokemon/raichu", pokemon_body(26, "raichu"));
    let state = test_state(upstream.clone());

    let results = state.service.get_pokemon_by_type("Electric").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(state.cache.write().await.has("pokemon:list:electric"));

    let calls_before = upstream.total_calls();
    let cached = state.service.get_pokemon_by_type("electric").await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(upstream.total_calls(), calls_before);
}

// == Search Flow ==

#[tokio::test]
async fn test_search_returns_none_on_upstream_not_found() {
    let upstream = MockUpstream::new();
    let state = test_state(upstream);

    let result = state.service.search_pokemon("missingno").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_search_caches_the_summary() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon/eevee", pokemon_body(133, "eevee"));
    let state = test_state(upstream.clone());

    let found = state.service.search_pokemon("Eevee").await.unwrap().unwrap();
    assert_eq!(found.id, 133);

    let again = state.service.search_pokemon("eevee").await.unwrap().unwrap();
    assert_eq!(again, found);
    assert_eq!(upstream.call_count("pokemon/eevee"), 1);
}

// == HTTP Surface ==

fn test_app(upstream: MockUpstream) -> Router {
    create_router(test_state(upstream))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_endpoint_returns_enriched_page() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let app = test_app(upstream);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/pokemon?name=chu")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["results"][0]["name"], "pikachu");
    assert!(json["results"][0].get("imageUrl").is_some());
}

#[tokio::test]
async fn test_detail_endpoint_returns_chain_and_404s_unknown() {
    let upstream = MockUpstream::new();
    upstream.respond("pokemon/pikachu", pokemon_body(25, "pikachu"));
    upstream.respond("pokemon-species/pikachu", species_body(10));
    upstream.respond("evolution-chain/10/", chain_body());
    let app = test_app(upstream);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/pokemon/pikachu")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["evolutionChain"][0]["name"], "pichu");
    assert_eq!(json["evolutionChain"][2]["name"], "raichu");

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/pokemon/missingno")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cache_stats_and_flush_endpoints() {
    let upstream = MockUpstream::new();
    seed_three_pokemon(&upstream);
    let app = test_app(upstream);

    // Generate some cache traffic
    app.clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/pokemon")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let stats = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    let json = body_to_json(stats.into_body()).await;
    assert!(json["keyCount"].as_u64().unwrap() >= 4);
    assert!(json["hitRate"].as_str().unwrap().ends_with('%'));

    // Flush, then stats report an empty store
    let flush = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(flush.status(), StatusCode::OK);

    let stats = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(stats.into_body()).await;
    assert_eq!(json["keyCount"], 0);
    assert_eq!(json["hitCount"], 0);
    assert_eq!(json["hitRate"], "0.00%");
}
