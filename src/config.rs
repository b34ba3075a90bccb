//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Base URL of the upstream PokeAPI
    pub upstream_base_url: String,
    /// Per-request upstream timeout in seconds
    pub upstream_timeout: u64,
    /// Number of detail lookups issued concurrently per batch
    pub batch_size: usize,
    /// Pacing delay between batches in milliseconds
    pub batch_delay_ms: u64,
    /// Interval in seconds between detail-namespace purges
    pub detail_purge_interval: u64,
    /// Interval in seconds between list-namespace purges
    pub list_purge_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 1800)
    /// - `CLEANUP_INTERVAL` - Expired-entry sweep frequency in seconds (default: 120)
    /// - `UPSTREAM_BASE_URL` - PokeAPI base URL (default: https://pokeapi.co/api/v2)
    /// - `UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 10)
    /// - `BATCH_SIZE` - Concurrent detail lookups per batch (default: 10)
    /// - `BATCH_DELAY_MS` - Pacing delay between batches (default: 100)
    /// - `DETAIL_PURGE_INTERVAL` - Detail-namespace purge interval in seconds (default: 21600)
    /// - `LIST_PURGE_INTERVAL` - List-namespace purge interval in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 3000),
            max_entries: env_or("MAX_ENTRIES", 1000),
            default_ttl: env_or("DEFAULT_TTL", 1800),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 120),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://pokeapi.co/api/v2".to_string()),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", 10),
            batch_size: env_or("BATCH_SIZE", 10),
            batch_delay_ms: env_or("BATCH_DELAY_MS", 100),
            detail_purge_interval: env_or("DETAIL_PURGE_INTERVAL", 6 * 60 * 60),
            list_purge_interval: env_or("LIST_PURGE_INTERVAL", 60 * 60),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_entries: 1000,
            default_ttl: 1800,
            cleanup_interval: 120,
            upstream_base_url: "https://pokeapi.co/api/v2".to_string(),
            upstream_timeout: 10,
            batch_size: 10,
            batch_delay_ms: 100,
            detail_purge_interval: 6 * 60 * 60,
            list_purge_interval: 60 * 60,
        }
    }
}
