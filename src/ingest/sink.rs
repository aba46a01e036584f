//! Destinations for extracted records.
//!
//! The collector talks to the relational store and the search index only
//! through these traits, so a run can be exercised against in-memory fakes.

use crate::db::EmailStore;
use crate::models::EmailRecord;
use crate::search::{SearchClient, SearchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database insert failed: {0}")]
    Store(#[from] sqlx::Error),
    #[error("search indexing failed: {0}")]
    Index(#[from] SearchError),
    #[error("{0}")]
    Other(String),
}

/// Persists one record per call into the relational store.
#[rocket::async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn save(&self, record: &EmailRecord) -> Result<(), SinkError>;
}

/// Submits one record per call as a search document.
#[rocket::async_trait]
pub trait RecordIndex: Send + Sync + 'static {
    async fn index(&self, record: &EmailRecord) -> Result<(), SinkError>;
}

#[rocket::async_trait]
impl RecordStore for EmailStore {
    async fn save(&self, record: &EmailRecord) -> Result<(), SinkError> {
        self.insert(record).await.map_err(SinkError::from)
    }
}

#[rocket::async_trait]
impl RecordIndex for SearchClient {
    async fn index(&self, record: &EmailRecord) -> Result<(), SinkError> {
        self.index_document(record).await.map_err(SinkError::from)
    }
}
