//! Error types for the aggregation server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Aggregator Error Enum ==
/// Unified error type for the aggregation server.
///
/// Derives `Clone` so a single failed upstream fetch can be delivered to
/// every caller joined on the same coalesced request.
#[derive(Error, Debug, Clone)]
pub enum AggregatorError {
    /// Upstream answered with a non-success HTTP status
    #[error("upstream returned HTTP {status} for '{path}'")]
    UpstreamStatus { status: u16, path: String },

    /// No response from upstream (timeout, connection refused, DNS)
    #[error("no response from upstream for '{path}': {reason}")]
    UpstreamUnreachable { path: String, reason: String },

    /// Upstream responded but the payload could not be decoded
    #[error("upstream payload for '{path}' could not be decoded: {reason}")]
    UpstreamDecode { path: String, reason: String },

    /// Internal cache failure (serialization, invalid pattern)
    #[error("cache failure: {0}")]
    Cache(String),

    /// Invalid request data
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AggregatorError::UpstreamStatus { status, .. } if *status == 404 => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AggregatorError::UpstreamStatus { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AggregatorError::UpstreamUnreachable { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            AggregatorError::UpstreamDecode { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AggregatorError::Cache(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AggregatorError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the aggregation server.
pub type Result<T> = std::result::Result<T, AggregatorError>;
