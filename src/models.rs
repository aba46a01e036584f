use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

// ===== Core Record =====

/// One email extracted from a source file.
///
/// Every header-backed field is an empty string when the header was not
/// found. `date` is the exception: `None` means the `Date:` header was
/// absent, `Some("")` means it was present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(default)]
pub struct EmailRecord {
    pub message_id: String,
    pub sender: String,
    pub receiver: String,
    pub subject: String,
    pub mime_version: String,
    pub content_type: String,
    pub encoding: String,
    pub folder: String,
    /// First line following the header/body separator only.
    pub body: String,
    pub date: Option<String>,
}

// ===== Relational Rows =====

/// An [`EmailRecord`] as stored in the `emails` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct StoredEmail {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: EmailRecord,
}

// ===== API Responses =====

/// Page of emails returned by the listing and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EmailPage<T> {
    pub emails: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> EmailPage<T> {
    pub fn new(emails: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        let total_pages = total_pages(total, limit);
        Self {
            emails,
            total,
            page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Number of pages needed to show `total` items `limit` at a time.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

/// Static greeting served at the API root.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WelcomeResponse {
    pub message: String,
}
