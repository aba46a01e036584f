//! Search index integration: HTTP client, query DSL and errors.

pub mod client;
pub mod error;
pub mod query;

pub use client::{SearchClient, SearchHits, parse_search_response};
pub use error::SearchError;
pub use query::SubjectQuery;
