//! Pokemon Aggregation Service
//!
//! Cache-aside orchestration over the upstream PokeAPI: paged listings are
//! enriched in rate-limited batches, per-entity details are fetched with a
//! long TTL, and duplicate concurrent list fetches are coalesced.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::{keys, ttl, CacheStore};
use crate::coalesce::RequestCoalescer;
use crate::error::{AggregatorError, Result};
use crate::fetch::BatchFetcher;
use crate::models::{EvolutionLink, ListQuery, PokemonDetail, PokemonSummary};
use crate::upstream::types::{
    EvolutionChainWire, EvolutionNodeWire, PagedListing, PokemonWire, SpeciesWire, TypeListing,
};
use crate::upstream::Upstream;

// == Pokemon Service ==
/// Façade answering list, detail, by-type and search queries with
/// cache-aside semantics.
///
/// List-level fetches are coalesced per cache key; per-item enrichment runs
/// through the batch fetcher so a burst of traffic never exceeds the
/// upstream rate budget.
pub struct PokemonService<U> {
    cache: Arc<RwLock<CacheStore>>,
    upstream: Arc<U>,
    batcher: BatchFetcher,
    list_fetches: RequestCoalescer<Vec<PokemonSummary>>,
    search_fetches: RequestCoalescer<Option<PokemonSummary>>,
}

impl<U: Upstream + 'static> PokemonService<U> {
    // == Constructor ==
    /// Creates a service over an injected store and upstream client.
    pub fn new(cache: Arc<RwLock<CacheStore>>, upstream: Arc<U>, batcher: BatchFetcher) -> Self {
        Self {
            cache,
            upstream,
            batcher,
            list_fetches: RequestCoalescer::new(),
            search_fetches: RequestCoalescer::new(),
        }
    }

    // == Get Pokemon List ==
    /// Returns one enriched listing page, name-filtered.
    ///
    /// The cache stores the page's full unfiltered content; the filter is
    /// re-applied on every hit and applies to this page's content only.
    /// Items that fail to enrich are omitted rather than failing the
    /// request.
    pub async fn get_pokemon_list(&self, query: &ListQuery) -> Result<Vec<PokemonSummary>> {
        let key = list_key(query.page, query.limit, query.name.as_deref());

        if let Some(cached) = cache_get::<Vec<PokemonSummary>>(&self.cache, &key).await {
            info!(key = %key, "returning cached pokemon list");
            return Ok(filter_by_name(cached, query.name.as_deref()));
        }

        let producer = {
            let cache = self.cache.clone();
            let upstream = self.upstream.clone();
            let batcher = self.batcher;
            let key = key.clone();
            let (page, limit) = (query.page, query.limit);
            async move { Self::fetch_list_page(cache, upstream, batcher, page, limit, key).await }
        };

        let page_content = self.list_fetches.run(&key, producer).await?;
        Ok(filter_by_name(page_content, query.name.as_deref()))
    }

    // == Get Pokemon By Name ==
    /// Returns the full detail for one pokemon.
    ///
    /// The primary lookup failing fails the request; the species or
    /// evolution-chain lookups failing degrade to an empty chain.
    pub async fn get_pokemon_by_name(&self, name: &str) -> Result<PokemonDetail> {
        let key = detail_key(name);

        if let Some(cached) = cache_get::<PokemonDetail>(&self.cache, &key).await {
            info!(name = %name, "returning cached pokemon detail");
            return Ok(cached);
        }

        let lower = name.to_lowercase();
        info!(name = %lower, "fetching pokemon detail from upstream");

        let pokemon_path = format!("pokemon/{lower}");
        let species_path = format!("pokemon-species/{lower}");
        let (primary, species) = tokio::join!(
            self.upstream.get(&pokemon_path),
            self.upstream.get(&species_path),
        );

        let wire: PokemonWire = decode(&format!("pokemon/{lower}"), primary?)?;

        let chain = match species {
            Ok(body) => self.resolve_evolution_chain(body).await,
            Err(err) => {
                warn!(name = %lower, error = %err, "species lookup failed, omitting evolution chain");
                Vec::new()
            }
        };

        let detail = PokemonDetail::from_wire(wire, chain);
        cache_put(&self.cache, &key, &detail, ttl::LONG).await;
        info!(name = %lower, "fetched and cached pokemon detail");
        Ok(detail)
    }

    // == Get Pokemon By Type ==
    /// Returns every pokemon of one type, enriched the same way a listing
    /// page is.
    pub async fn get_pokemon_by_type(&self, type_name: &str) -> Result<Vec<PokemonSummary>> {
        let lower = type_name.to_lowercase();
        let key = format!("{}:{}", keys::POKEMON_LIST, lower);

        if let Some(cached) = cache_get::<Vec<PokemonSummary>>(&self.cache, &key).await {
            info!(key = %key, "returning cached type listing");
            return Ok(cached);
        }

        let producer = {
            let cache = self.cache.clone();
            let upstream = self.upstream.clone();
            let batcher = self.batcher;
            let key = key.clone();
            async move { Self::fetch_type_members(cache, upstream, batcher, lower, key).await }
        };

        self.list_fetches.run(&key, producer).await
    }

    // == Search Pokemon ==
    /// Cache-aside single-name lookup; an upstream 404 yields `Ok(None)`
    /// instead of an error.
    pub async fn search_pokemon(&self, name: &str) -> Result<Option<PokemonSummary>> {
        let key = detail_key(name);

        if let Some(cached) = cache_get::<PokemonSummary>(&self.cache, &key).await {
            info!(name = %name, "returning cached pokemon summary");
            return Ok(Some(cached));
        }

        let pending_key = format!("search:{}", name.to_lowercase());
        let producer = {
            let cache = self.cache.clone();
            let upstream = self.upstream.clone();
            let name = name.to_string();
            async move {
                match Self::fetch_summary(cache, upstream, name).await {
                    Ok(summary) => Ok(Some(summary)),
                    Err(AggregatorError::UpstreamStatus { status: 404, .. }) => Ok(None),
                    Err(err) => Err(err),
                }
            }
        };

        self.search_fetches.run(&pending_key, producer).await
    }

    // == List Page Fetch ==
    /// Coalesced producer for one listing page: enumerate, enrich in
    /// batches, cache the assembled page.
    async fn fetch_list_page(
        cache: Arc<RwLock<CacheStore>>,
        upstream: Arc<U>,
        batcher: BatchFetcher,
        page: u32,
        limit: u32,
        key: String,
    ) -> Result<Vec<PokemonSummary>> {
        info!(page, limit, "fetching pokemon list from upstream");

        let path = format!("pokemon?limit={limit}&offset={page}");
        let listing: PagedListing = decode(&path, upstream.get(&path).await?)?;
        let names: Vec<String> = listing.results.into_iter().map(|r| r.name).collect();

        let enriched = Self::enrich_names(&cache, &upstream, batcher, &names).await;

        cache_put(&cache, &key, &enriched, ttl::SHORT).await;
        info!(count = enriched.len(), key = %key, "fetched and cached pokemon list");
        Ok(enriched)
    }

    // == Type Members Fetch ==
    async fn fetch_type_members(
        cache: Arc<RwLock<CacheStore>>,
        upstream: Arc<U>,
        batcher: BatchFetcher,
        type_name: String,
        key: String,
    ) -> Result<Vec<PokemonSummary>> {
        info!(type_name = %type_name, "fetching type members from upstream");

        let path = format!("type/{type_name}");
        let listing: TypeListing = decode(&path, upstream.get(&path).await?)?;
        let names: Vec<String> = listing
            .pokemon
            .into_iter()
            .map(|member| member.pokemon.name)
            .collect();

        let enriched = Self::enrich_names(&cache, &upstream, batcher, &names).await;

        cache_put(&cache, &key, &enriched, ttl::SHORT).await;
        info!(count = enriched.len(), key = %key, "fetched and cached type listing");
        Ok(enriched)
    }

    // == Batched Enrichment ==
    /// Resolves names to summaries through the batch fetcher; every
    /// success lands in the detail namespace individually, so later
    /// single-item lookups hit cache even when this call was for a list.
    /// Failed items are dropped from the assembled result.
    async fn enrich_names(
        cache: &Arc<RwLock<CacheStore>>,
        upstream: &Arc<U>,
        batcher: BatchFetcher,
        names: &[String],
    ) -> Vec<PokemonSummary> {
        let fetched = batcher
            .fetch_all(names, |name| {
                let cache = cache.clone();
                let upstream = upstream.clone();
                async move { Self::fetch_summary(cache, upstream, name).await }
            })
            .await;

        fetched
            .into_iter()
            .filter_map(|(_, summary)| summary)
            .collect()
    }

    // == Per-Item Fetch ==
    /// Cache-aside summary lookup in the detail namespace. A cached full
    /// detail satisfies this read; a fresh fetch stores the summary with a
    /// long TTL.
    async fn fetch_summary(
        cache: Arc<RwLock<CacheStore>>,
        upstream: Arc<U>,
        name: String,
    ) -> Result<PokemonSummary> {
        let key = detail_key(&name);

        if let Some(cached) = cache_get::<PokemonSummary>(&cache, &key).await {
            return Ok(cached);
        }

        let path = format!("pokemon/{}", name.to_lowercase());
        let wire: PokemonWire = decode(&path, upstream.get(&path).await?)?;
        let summary = PokemonSummary::from(wire);

        cache_put(&cache, &key, &summary, ttl::LONG).await;
        Ok(summary)
    }

    // == Evolution Chain ==
    /// Walks the species payload to the evolution chain and flattens it.
    /// Every failure along the way degrades to an empty chain.
    async fn resolve_evolution_chain(&self, species_body: Value) -> Vec<EvolutionLink> {
        let species: SpeciesWire = match serde_json::from_value(species_body) {
            Ok(species) => species,
            Err(err) => {
                warn!(error = %err, "species payload decode failed, omitting evolution chain");
                return Vec::new();
            }
        };

        let Some(chain_ref) = species.evolution_chain else {
            return Vec::new();
        };

        let path = api_relative_path(&chain_ref.url);
        match self.upstream.get(&path).await {
            Ok(body) => match serde_json::from_value::<EvolutionChainWire>(body) {
                Ok(wire) => flatten_evolution(&wire.chain),
                Err(err) => {
                    warn!(error = %err, "evolution chain decode failed, omitting chain");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(error = %err, "evolution chain fetch failed, omitting chain");
                Vec::new()
            }
        }
    }
}

// == Cache Helpers ==
/// Typed cache read. A payload that fails to decode is logged and treated
/// as a miss, never as a request failure.
async fn cache_get<T: DeserializeOwned>(cache: &RwLock<CacheStore>, key: &str) -> Option<T> {
    let value = cache.write().await.get(key)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(err) => {
            warn!(key = %key, error = %err, "cached payload failed to decode, treating as miss");
            None
        }
    }
}

/// Typed cache write. Store failures are logged and swallowed; a request
/// never fails because its result could not be cached.
async fn cache_put<T: Serialize>(cache: &RwLock<CacheStore>, key: &str, value: &T, ttl_seconds: u64) {
    match serde_json::to_value(value) {
        Ok(json) => {
            if let Err(err) = cache.write().await.set(key.to_string(), json, Some(ttl_seconds)) {
                warn!(key = %key, error = %err, "cache write failed");
            }
        }
        Err(err) => {
            warn!(key = %key, error = %err, "payload serialization failed, skipping cache write");
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|err| AggregatorError::UpstreamDecode {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

// == Key Construction ==
fn list_key(page: u32, limit: u32, name: Option<&str>) -> String {
    format!(
        "{}:{}_{}_{}",
        keys::POKEMON_LIST,
        page,
        limit,
        name.filter(|n| !n.is_empty()).unwrap_or("all")
    )
}

fn detail_key(name: &str) -> String {
    format!("{}:{}", keys::POKEMON_DETAIL, name.to_lowercase())
}

// == Name Filtering ==
/// Case-insensitive substring filter over one page's content.
fn filter_by_name(pokemons: Vec<PokemonSummary>, name: Option<&str>) -> Vec<PokemonSummary> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return pokemons;
    };
    let needle = name.to_lowercase();
    pokemons
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

// == Evolution Flattening ==
/// Flattens the evolution tree depth-first, parent before children, using
/// an explicit stack so pathological chain depths cannot overflow the call
/// stack.
fn flatten_evolution(root: &EvolutionNodeWire) -> Vec<EvolutionLink> {
    let mut links = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        links.push(EvolutionLink {
            name: node.species.name.clone(),
            id: extract_id_from_url(&node.species.url).unwrap_or(0),
        });
        // Reverse push keeps siblings in declaration order
        for child in node.evolves_to.iter().rev() {
            stack.push(child);
        }
    }

    links
}

/// Parses the trailing numeric segment of a resource URL,
/// e.g. `.../pokemon-species/172/` -> 172.
fn extract_id_from_url(url: &str) -> Option<u32> {
    url.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()?
        .parse()
        .ok()
}

/// Reduces an absolute API URL to the path the upstream client expects.
fn api_relative_path(url: &str) -> String {
    url.split_once("/api/v2/")
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_else(|| url.trim_start_matches('/').to_string())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_key_includes_filter_or_all() {
        assert_eq!(list_key(0, 20, None), "pokemon:list:0_20_all");
        assert_eq!(list_key(40, 60, Some("chu")), "pokemon:list:40_60_chu");
        assert_eq!(list_key(0, 20, Some("")), "pokemon:list:0_20_all");
    }

    #[test]
    fn test_detail_key_lowercases() {
        assert_eq!(detail_key("Pikachu"), "pokemon:detail:pikachu");
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive_substring() {
        let pokemons: Vec<PokemonSummary> = ["pikachu", "raichu", "eevee"]
            .iter()
            .enumerate()
            .map(|(i, name)| PokemonSummary {
                id: i as u32 + 1,
                name: name.to_string(),
                image_url: None,
                types: Vec::new(),
                abilities: Vec::new(),
            })
            .collect();

        let filtered = filter_by_name(pokemons.clone(), Some("CHU"));
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pikachu", "raichu"]);

        assert_eq!(filter_by_name(pokemons.clone(), None).len(), 3);
        assert_eq!(filter_by_name(pokemons, Some("")).len(), 3);
    }

    #[test]
    fn test_flatten_evolution_is_depth_first_parent_first() {
        let chain: EvolutionNodeWire = serde_json::from_value(json!({
            "species": { "name": "pichu", "url": "https://pokeapi.co/api/v2/pokemon-species/172/" },
            "evolves_to": [ {
                "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" },
                "evolves_to": [ {
                    "species": { "name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon-species/26/" },
                    "evolves_to": []
                } ]
            } ]
        }))
        .unwrap();

        let links = flatten_evolution(&chain);
        assert_eq!(
            links,
            vec![
                EvolutionLink { name: "pichu".to_string(), id: 172 },
                EvolutionLink { name: "pikachu".to_string(), id: 25 },
                EvolutionLink { name: "raichu".to_string(), id: 26 },
            ]
        );
    }

    #[test]
    fn test_flatten_evolution_branching_keeps_sibling_order() {
        let chain: EvolutionNodeWire = serde_json::from_value(json!({
            "species": { "name": "eevee", "url": "https://pokeapi.co/api/v2/pokemon-species/133/" },
            "evolves_to": [
                { "species": { "name": "vaporeon", "url": "https://pokeapi.co/api/v2/pokemon-species/134/" } },
                { "species": { "name": "jolteon", "url": "https://pokeapi.co/api/v2/pokemon-species/135/" } },
                { "species": { "name": "flareon", "url": "https://pokeapi.co/api/v2/pokemon-species/136/" } }
            ]
        }))
        .unwrap();

        let names: Vec<String> = flatten_evolution(&chain)
            .into_iter()
            .map(|link| link.name)
            .collect();
        assert_eq!(names, vec!["eevee", "vaporeon", "jolteon", "flareon"]);
    }

    #[test]
    fn test_extract_id_from_url() {
        assert_eq!(
            extract_id_from_url("https://pokeapi.co/api/v2/pokemon-species/172/"),
            Some(172)
        );
        assert_eq!(extract_id_from_url("https://pokeapi.co/api/v2/x/not-a-number/"), None);
    }

    #[test]
    fn test_api_relative_path() {
        assert_eq!(
            api_relative_path("https://pokeapi.co/api/v2/evolution-chain/10/"),
            "evolution-chain/10/"
        );
        assert_eq!(api_relative_path("/evolution-chain/10/"), "evolution-chain/10/");
    }
}
