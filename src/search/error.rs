use crate::config::ConfigError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that occur while talking to the search index service.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search index HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search index returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("search index is not configured: {0}")]
    Config(#[from] ConfigError),
}

impl SearchError {
    pub fn status(status: StatusCode, body: String) -> Self {
        SearchError::Status { status, body }
    }
}
