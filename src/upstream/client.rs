//! Upstream Client
//!
//! Narrow HTTP contract to the PokeAPI. Path construction is the caller's
//! responsibility; the client owns base URL joining, timeouts, and sorting
//! failures into distinguishable classes for logging and response mapping.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{AggregatorError, Result};

// == Upstream Contract ==
/// The single seam through which the core reaches the outside world.
///
/// Implementations must distinguish "no response" from "HTTP error status"
/// from other failures via the corresponding `AggregatorError` variants.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches `path` (relative to the client's base URL) and returns the
    /// decoded JSON body.
    async fn get(&self, path: &str) -> Result<Value>;
}

// == PokeAPI Client ==
/// Reqwest-backed upstream client with a fixed per-request timeout.
///
/// A timeout is reported as a normal fetch failure; the core does not retry.
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    // == Constructor ==
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Upstream for PokeApiClient {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "upstream request");

        let response = self.http.get(&url).send().await.map_err(|err| {
            if err.is_timeout() || err.is_connect() {
                error!(path = %path, error = %err, "no response from upstream");
                AggregatorError::UpstreamUnreachable {
                    path: path.to_string(),
                    reason: err.to_string(),
                }
            } else {
                error!(path = %path, error = %err, "upstream request failed");
                AggregatorError::UpstreamDecode {
                    path: path.to_string(),
                    reason: err.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(path = %path, status = status.as_u16(), "upstream error status");
            return Err(AggregatorError::UpstreamStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response.json::<Value>().await.map_err(|err| {
            error!(path = %path, error = %err, "upstream payload decode failed");
            AggregatorError::UpstreamDecode {
                path: path.to_string(),
                reason: err.to_string(),
            }
        })
    }
}
