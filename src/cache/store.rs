//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration,
//! insertion-order capacity eviction, and wildcard pattern deletion.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, InsertionTracker, MAX_KEY_LENGTH};
use crate::error::{AggregatorError, Result};

// == Cache Store ==
/// Main cache storage with TTL support and bounded capacity.
///
/// The store itself is plain single-threaded state; components share it as
/// `Arc<RwLock<CacheStore>>` so writes are linearized per key and pattern
/// deletion is atomic with respect to concurrent readers.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Insertion-order tracker for capacity eviction
    insertion: InsertionTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `default_ttl` - Default TTL in seconds for entries without explicit TTL
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            insertion: InsertionTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and both expiry
    /// and insertion position are reset. If the cache is at capacity, the
    /// oldest-inserted entry is evicted first.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl` - TTL in seconds; `None` uses the store default, `Some(0)` means no expiry
    pub fn set(&mut self, key: String, value: Value, ttl: Option<u64>) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(AggregatorError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let is_overwrite = self.entries.contains_key(&key);

        // If not overwriting and at capacity, evict the oldest insertion
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.insertion.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(key = %evicted_key, "cache evicted oldest entry");
            } else {
                return Err(AggregatorError::Cache(
                    "cache is full and eviction failed".to_string(),
                ));
            }
        }

        // ttl = 0 disables expiry entirely
        let effective_ttl = match ttl.unwrap_or(self.default_ttl) {
            0 => None,
            secs => Some(secs),
        };

        let entry = CacheEntry::new(value, effective_ttl);
        self.entries.insert(key.clone(), entry);
        self.insertion.record(&key);
        self.stats.set_key_count(self.entries.len());

        debug!(key = %key, ttl = ?effective_ttl, "cache set");
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and unexpired; expired entries are
    /// purged and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.purge(key);
                self.stats.record_miss();
                debug!(key = %key, "cache miss (expired)");
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            debug!(key = %key, "cache hit");
            Some(value)
        } else {
            self.stats.record_miss();
            debug!(key = %key, "cache miss");
            None
        }
    }

    // == Has ==
    /// Checks whether a key is present and unexpired.
    ///
    /// Does not touch the hit/miss counters.
    pub fn has(&mut self, key: &str) -> bool {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.purge(key);
                return false;
            }
            true
        } else {
            false
        }
    }

    // == TTL Remaining ==
    /// Returns the remaining TTL in seconds for a key.
    ///
    /// `None` for absent or expired keys; `Some(0)` also covers entries
    /// without an expiry, mirroring `ttl = 0` on `set`.
    pub fn ttl_remaining(&mut self, key: &str) -> Option<u64> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.purge(key);
                return None;
            }
            Some(entry.ttl_remaining().unwrap_or(0))
        } else {
            None
        }
    }

    // == Update TTL ==
    /// Resets the TTL of an existing key.
    ///
    /// Returns false if the key is absent or already expired.
    pub fn update_ttl(&mut self, key: &str, ttl_seconds: u64) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                let refreshed = CacheEntry::new(entry.value.clone(), match ttl_seconds {
                    0 => None,
                    secs => Some(secs),
                });
                *entry = refreshed;
                true
            }
            _ => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns the number of entries removed (0 or 1).
    pub fn delete(&mut self, key: &str) -> usize {
        if self.entries.remove(key).is_some() {
            self.insertion.remove(key);
            self.stats.set_key_count(self.entries.len());
            debug!(key = %key, "cache deleted");
            1
        } else {
            0
        }
    }

    // == Delete Pattern ==
    /// Removes all keys matching a namespace pattern, e.g. `pokemon:detail:*`.
    ///
    /// The pattern supports exactly one `*` wildcard; literal parts are
    /// matched verbatim and the match is anchored at the start of the key.
    /// Returns the number of entries removed.
    pub fn delete_pattern(&mut self, pattern: &str) -> Result<usize> {
        let regex = pattern_to_regex(pattern)?;

        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| regex.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.insertion.remove(key);
        }
        self.stats.set_key_count(self.entries.len());

        if !matching.is_empty() {
            info!(pattern = %pattern, count = matching.len(), "cache pattern deletion");
        }
        Ok(matching.len())
    }

    // == Flush ==
    /// Removes all entries and resets statistics.
    pub fn flush(&mut self) {
        self.entries.clear();
        self.insertion.clear();
        self.stats.reset();
        info!("cache flushed");
    }

    // == Stats ==
    /// Returns a snapshot of the current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_key_count(self.entries.len());
        stats
    }

    // == Keys ==
    /// Returns all currently stored keys, expired ones included until the
    /// next sweep touches them.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.purge(&key);
            debug!(key = %key, "cache key expired");
        }

        count
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Physically removes a key from storage and bookkeeping.
    fn purge(&mut self, key: &str) {
        self.entries.remove(key);
        self.insertion.remove(key);
        self.stats.set_key_count(self.entries.len());
    }
}

// == Pattern Translation ==
/// Converts a namespace pattern with at most one `*` wildcard into an
/// anchored regular expression.
fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    if pattern.matches('*').count() > 1 {
        return Err(AggregatorError::InvalidRequest(format!(
            "pattern '{}' contains more than one wildcard",
            pattern
        )));
    }

    let translated = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{}", translated))
        .map_err(|err| AggregatorError::Cache(format!("invalid pattern '{}': {}", pattern, err)))
}
