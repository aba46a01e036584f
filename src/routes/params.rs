//! Query parameter types for the email endpoints.
//!
//! Values are parsed leniently by Rocket's `FromForm` and then checked by
//! `validate`, which produces the JSON error bodies clients rely on
//! (`max_limit`, `requested_limit`).

use crate::error::ApiError;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MAX_LIMIT: i64 = 100;

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    10
}

fn check_window(page: i64, limit: i64) -> Result<(), ApiError> {
    if page < 1 {
        return Err(ApiError::BadRequest(format!(
            "invalid page {page}; pages start at 1"
        )));
    }
    if limit < 1 {
        return Err(ApiError::BadRequest(format!(
            "invalid limit {limit}; limit must be at least 1"
        )));
    }
    if limit > MAX_LIMIT {
        return Err(ApiError::InvalidParameter {
            message: format!("the maximum limit is {MAX_LIMIT}"),
            details: json!({ "max_limit": MAX_LIMIT, "requested_limit": limit }),
        });
    }
    if (page - 1).checked_mul(limit).is_none() {
        return Err(ApiError::BadRequest(format!(
            "invalid page {page}; offset does not fit in 64 bits"
        )));
    }
    Ok(())
}

/// Pagination for the relational listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
pub struct PaginationParams {
    /// One-based page index (defaults to 1).
    #[field(default = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Rows per page, between 1 and 100 (defaults to 10).
    #[field(default = 10)]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_window(self.page, self.limit)
    }

    /// Row offset of the first item on `page`. Saturates for windows that
    /// `validate` rejects.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

/// Parameters for the subject search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
pub struct SearchParams {
    /// Term matched against the `subject` field. Required.
    #[serde(default)]
    pub query: Option<String>,
    #[field(default = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    #[field(default = 10)]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl SearchParams {
    /// Validate and return the search term.
    pub fn validate(&self) -> Result<&str, ApiError> {
        let term = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .ok_or_else(|| ApiError::BadRequest("search query must not be empty".to_string()))?;

        check_window(self.page, self.limit)?;
        Ok(term)
    }
}
