//! Request DTOs for the aggregation server API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query parameters for the list endpoint (GET /api/v1/pokemon)
///
/// # Fields
/// - `page`: upstream listing offset (default 0)
/// - `limit`: page size (default 20, capped at 200)
/// - `name`: optional case-insensitive substring filter
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_limit() -> u32 {
    20
}

impl ListQuery {
    /// Validates the query parameters.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.limit == 0 {
            return Some("limit must be at least 1".to_string());
        }
        if self.limit > 200 {
            return Some("limit must not exceed 200".to_string());
        }
        None
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 0,
            limit: default_limit(),
            name: None,
        }
    }
}
