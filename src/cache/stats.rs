//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
///
/// Hit and miss counters increase monotonically with every `get` and are
/// reset only by an explicit `flush`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to the capacity policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub key_count: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate as a percentage in `[0.0, 100.0]`.
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Formats the hit rate to two decimals with a trailing percent sign,
    /// e.g. `"66.67%"`. With no traffic this is `"0.00%"`.
    pub fn hit_rate_display(&self) -> String {
        format!("{:.2}%", self.hit_rate())
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Entry Count ==
    /// Updates the key count.
    pub fn set_key_count(&mut self, count: usize) {
        self.key_count = count;
    }

    // == Reset ==
    /// Resets all counters to zero. Only called by an explicit flush.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
