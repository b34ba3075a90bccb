//! Batch Fetching Module
//!
//! Fans a list of item identifiers out to an upstream fetch in fixed-size
//! batches, pacing batches to stay under upstream rate limits.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Result;

// == Batch Fetcher ==
/// Fetches per-item details in fixed-size concurrent batches.
///
/// Within a batch all fetches run concurrently; a failing item yields `None`
/// for its position without aborting the batch or the overall call. Between
/// batches a fixed pacing delay is inserted, skipped after the final batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchFetcher {
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchFetcher {
    // == Constructor ==
    /// Creates a fetcher with the given batch size and inter-batch delay.
    ///
    /// A batch size of zero is treated as one.
    pub fn new(batch_size: usize, batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    // == Fetch All ==
    /// Runs `per_item` for every id, batch by batch.
    ///
    /// The returned vector always has exactly `ids.len()` positions in input
    /// order; failed items hold `None`. Callers that only want the
    /// successes filter the `None`s out themselves.
    pub async fn fetch_all<T, F, Fut>(&self, ids: &[String], per_item: F) -> Vec<(String, Option<T>)>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut results = Vec::with_capacity(ids.len());
        let batch_count = ids.len().div_ceil(self.batch_size);

        for (index, chunk) in ids.chunks(self.batch_size).enumerate() {
            debug!(
                batch = index + 1,
                of = batch_count,
                size = chunk.len(),
                "fetching batch"
            );

            let outcomes = join_all(chunk.iter().map(|id| {
                let id = id.clone();
                let fetch = per_item(id.clone());
                async move {
                    match fetch.await {
                        Ok(value) => Some(value),
                        Err(err) => {
                            warn!(id = %id, error = %err, "item fetch failed, yielding null");
                            None
                        }
                    }
                }
            }))
            .await;

            results.extend(chunk.iter().cloned().zip(outcomes));

            // Pacing delay, skipped after the final batch
            if index + 1 < batch_count {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        results
    }
}
