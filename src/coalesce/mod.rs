//! Request Coalescing Module
//!
//! Deduplicates concurrent fetches for the same key so only one upstream
//! request is in flight per key at any instant.

use std::collections::HashMap;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

// == Request Coalescer ==
/// Per-key rendezvous for in-flight fetches.
///
/// The first caller for a key becomes the leader: its producer future is
/// boxed, made shareable, and registered in the pending map. Callers that
/// arrive while the fetch is in flight await the same shared future and
/// receive the same outcome, success or failure. The leader removes the
/// entry once the fetch settles, so a failure is never cached and the next
/// caller starts a fresh attempt.
///
/// Holds no data beyond the lifetime of the fetch itself.
pub struct RequestCoalescer<T: Clone> {
    pending: Mutex<HashMap<String, SharedFetch<T>>>,
}

impl<T: Clone + Send + Sync + 'static> RequestCoalescer<T> {
    // == Constructor ==
    /// Creates a coalescer with an empty pending map.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    // == Run ==
    /// Runs `producer` for `key`, or joins the fetch already in flight.
    ///
    /// The producer of a joining caller is dropped without ever being
    /// polled; across N concurrent callers exactly one producer executes.
    pub async fn run<F>(&self, key: &str, producer: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>> + Send + 'static,
    {
        let (fetch, is_leader) = {
            let mut pending = self.pending.lock().await;
            match pending.get(key) {
                Some(in_flight) => {
                    debug!(key = %key, "joining in-flight fetch");
                    (in_flight.clone(), false)
                }
                None => {
                    let fetch = producer.boxed().shared();
                    pending.insert(key.to_string(), fetch.clone());
                    (fetch, true)
                }
            }
        };

        let result = fetch.await;

        // Only the leader unregisters; a joiner settling late must not
        // remove a newer fetch registered under the same key.
        if is_leader {
            self.pending.lock().await.remove(key);
        }

        result
    }

    // == Pending Count ==
    /// Number of fetches currently in flight.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for RequestCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
