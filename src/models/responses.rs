//! Response DTOs for the aggregation server API
//!
//! Defines the structure of outgoing HTTP response bodies. Serialized
//! camelCase to match the domain DTOs.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::PokemonSummary;

/// Response body for listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Number of entries returned after filtering
    pub count: usize,
    pub results: Vec<PokemonSummary>,
}

impl ListResponse {
    pub fn new(results: Vec<PokemonSummary>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Response body for the cache stats endpoint (GET /api/v1/cache)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Current number of entries in the cache
    pub key_count: usize,
    /// Number of cache hits since start or last flush
    pub hit_count: u64,
    /// Number of cache misses since start or last flush
    pub miss_count: u64,
    /// Hit percentage formatted to two decimals, e.g. "66.67%"
    pub hit_rate: String,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            key_count: stats.key_count,
            hit_count: stats.hits,
            miss_count: stats.misses,
            hit_rate: stats.hit_rate_display(),
        }
    }
}

/// Response body for the cache flush endpoint (DELETE /api/v1/cache)
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
}

impl FlushResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
        }
    }
}

impl Default for FlushResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
