use super::error::SearchError;
use super::query::SubjectQuery;
use crate::config::SearchConfig;
use crate::models::EmailRecord;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for a ZincSearch-compatible index.
///
/// Every request carries basic-auth credentials and targets the configured
/// index under `{base_url}/{index}/...`.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

/// Hits returned for one page of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub emails: Vec<EmailRecord>,
    pub total: i64,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("email-indexer/0.1")
            .build()?;

        Ok(Self { http, config })
    }

    fn url_for(&self, action: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.index,
            action
        )
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        action: &str,
        payload: &T,
    ) -> Result<Response, SearchError> {
        let response = self
            .http
            .post(self.url_for(action))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }

    /// Create one document for `record` in the index.
    ///
    /// Both `200 OK` and `201 Created` count as success.
    pub async fn index_document(&self, record: &EmailRecord) -> Result<(), SearchError> {
        let response = self.post_json("_doc", record).await?;
        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::CREATED {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SearchError::status(status, body))
        }
    }

    /// Run a subject match and return the hits for the requested window.
    pub async fn search(&self, query: &SubjectQuery) -> Result<SearchHits, SearchError> {
        log::debug!(
            "searching {} for '{}' (from {}, size {})",
            self.config.index,
            query.term,
            query.from,
            query.size
        );

        let response = self.post_json("_search", &query.to_dsl()).await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(SearchError::status(status, body));
        }

        let body = response.bytes().await?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    total: HitsTotal,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Default, Deserialize)]
struct HitsTotal {
    #[serde(default)]
    value: i64,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: EmailRecord,
}

/// Decode a `_search` response body into records and the total hit count.
pub fn parse_search_response(body: &[u8]) -> Result<SearchHits, SearchError> {
    let parsed: SearchResponse = serde_json::from_slice(body)?;
    Ok(SearchHits {
        emails: parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source)
            .collect(),
        total: parsed.hits.total.value,
    })
}
