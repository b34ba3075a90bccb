//! Pokedex Cache - A caching aggregation server for the PokeAPI
//!
//! Fronts the slow, rate-limited PokeAPI with an in-process TTL cache,
//! coalesces duplicate concurrent fetches, and batches per-item detail
//! lookups to stay under upstream load limits.

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod service;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_invalidation_tasks, InvalidationRule};
