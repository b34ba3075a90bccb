//! Domain and transport models for the aggregation server
//!
//! Defines the pokemon DTOs served and cached by the service and the
//! request/response bodies of the HTTP API.

pub mod pokemon;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use pokemon::{AbilityInfo, EvolutionLink, PokemonDetail, PokemonSummary, StatValue, TypeSlot};
pub use requests::ListQuery;
pub use responses::{ErrorResponse, FlushResponse, HealthResponse, ListResponse, StatsResponse};
