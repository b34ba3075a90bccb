//! Scheduled Namespace Invalidation
//!
//! Periodic tasks that evict whole cache namespaces on fixed schedules,
//! decoupling staleness policy from request-time logic. Tasks never read
//! request state and are safe to run alongside any in-flight request.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{keys, CacheStore};
use crate::config::Config;

// == Invalidation Rule ==
/// One recurring purge: every `interval`, delete everything matching
/// `pattern`.
#[derive(Debug, Clone)]
pub struct InvalidationRule {
    /// Namespace pattern with a trailing wildcard, e.g. `pokemon:detail:*`
    pub pattern: String,
    /// Time between purges
    pub interval: Duration,
}

impl InvalidationRule {
    pub fn new(pattern: impl Into<String>, interval: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            interval,
        }
    }

    /// The default schedule: details every six hours, listings every hour.
    pub fn defaults_from(config: &Config) -> Vec<Self> {
        vec![
            Self::new(
                format!("{}:*", keys::POKEMON_DETAIL),
                Duration::from_secs(config.detail_purge_interval),
            ),
            Self::new(
                format!("{}:*", keys::POKEMON_LIST),
                Duration::from_secs(config.list_purge_interval),
            ),
        ]
    }
}

// == Task Spawning ==
/// Spawns one looping task per rule.
///
/// Each task sleeps its interval, then deletes the rule's namespace under
/// the store's write lock; no request-handling code ever awaits a task
/// result. The returned handles are aborted during graceful shutdown.
pub fn spawn_invalidation_tasks(
    cache: Arc<RwLock<CacheStore>>,
    rules: Vec<InvalidationRule>,
) -> Vec<JoinHandle<()>> {
    rules
        .into_iter()
        .map(|rule| {
            let cache = cache.clone();
            tokio::spawn(async move {
                info!(
                    pattern = %rule.pattern,
                    interval_secs = rule.interval.as_secs(),
                    "Starting scheduled invalidation task"
                );

                loop {
                    tokio::time::sleep(rule.interval).await;

                    let outcome = {
                        let mut cache_guard = cache.write().await;
                        cache_guard.delete_pattern(&rule.pattern)
                    };

                    match outcome {
                        Ok(removed) => {
                            info!(pattern = %rule.pattern, removed, "Scheduled invalidation ran");
                        }
                        Err(err) => {
                            warn!(pattern = %rule.pattern, error = %err, "Scheduled invalidation failed");
                        }
                    }
                }
            })
        })
        .collect()
}
