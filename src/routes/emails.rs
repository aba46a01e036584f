//! Read-only email endpoints.
//!
//! Listing and lookup are served from the relational store; `search` goes to
//! the search index. Both listings share the [`EmailPage`] envelope.

use crate::db::EmailStore;
use crate::error::ApiError;
use crate::models::{EmailPage, EmailRecord, StoredEmail, total_pages};
use crate::routes::params::{PaginationParams, SearchParams};
use crate::search::{SearchClient, SubjectQuery};
use rocket::{State, get, serde::json::Json};
use rocket_okapi::openapi;
use serde_json::json;

/// List stored emails ordered by id.
///
/// Requests past the last page are rejected with the highest valid page in
/// `details.max_pages`. The check is skipped on an empty table, so page 1
/// there is an empty 200 page instead of a 400 carrying `max_pages: 0`.
#[openapi(tag = "Emails")]
#[get("/emails?<params..>")]
pub async fn list_emails(
    params: PaginationParams,
    store: &State<EmailStore>,
) -> Result<Json<EmailPage<StoredEmail>>, ApiError> {
    params.validate()?;

    let total = store.count().await?;
    let max_pages = total_pages(total, params.limit);
    if total > 0 && params.page > max_pages {
        return Err(ApiError::InvalidParameter {
            message: format!("page {} is out of range", params.page),
            details: json!({ "max_pages": max_pages }),
        });
    }

    let emails = store.list(params.offset(), params.limit).await?;
    Ok(Json(EmailPage::new(emails, params.page, params.limit, total)))
}

/// Fetch one stored email by id.
#[openapi(tag = "Emails")]
#[get("/emails/<id>")]
pub async fn get_email(id: i64, store: &State<EmailStore>) -> Result<Json<StoredEmail>, ApiError> {
    store
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("email {id} not found")))
}

/// Match `query` against email subjects in the search index.
#[openapi(tag = "Emails")]
#[get("/emails/search?<params..>")]
pub async fn search_emails(
    params: SearchParams,
    search: &State<SearchClient>,
) -> Result<Json<EmailPage<EmailRecord>>, ApiError> {
    let term = params.validate()?;

    let query = SubjectQuery::for_page(term, params.page, params.limit);
    let hits = search.search(&query).await?;

    log::debug!("search '{}' matched {} emails", term, hits.total);
    Ok(Json(EmailPage::new(
        hits.emails,
        params.page,
        params.limit,
        hits.total,
    )))
}
