//! Relational store access for the `emails` table.

use crate::config::DatabaseConfig;
use crate::models::{EmailRecord, StoredEmail};
use rocket_db_pools::Database;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Pool used by the HTTP layer, configured under `databases.emails_db`.
#[derive(Database)]
#[database("emails_db")]
pub struct EmailDb(sqlx::PgPool);

const INSERT_EMAIL: &str = r#"
    INSERT INTO emails (
        message_id, sender, receiver, subject, mime_version,
        content_type, encoding, folder, body, date
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const SELECT_COLUMNS: &str = "id, message_id, sender, receiver, subject, mime_version, \
     content_type, encoding, folder, body, date";

/// Open the pool used by the ingestion pipeline.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(5 * 60))
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.url)
        .await
}

/// Typed access to the `emails` table.
#[derive(Clone)]
pub struct EmailStore {
    pool: PgPool,
}

impl EmailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one record. `date` is bound as a nullable parameter so an
    /// absent header stays `NULL` and an empty one stays `''`.
    pub async fn insert(&self, record: &EmailRecord) -> Result<(), sqlx::Error> {
        sqlx::query(INSERT_EMAIL)
            .bind(&record.message_id)
            .bind(&record.sender)
            .bind(&record.receiver)
            .bind(&record.subject)
            .bind(&record.mime_version)
            .bind(&record.content_type)
            .bind(&record.encoding)
            .bind(&record.folder)
            .bind(&record.body)
            .bind(record.date.as_deref())
            .execute(&self.pool)
            .await?;

        log::trace!("inserted email '{}'", record.message_id);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM emails")
            .fetch_one(&self.pool)
            .await
    }

    /// Fetch `limit` rows starting at `offset`, ordered by id.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<StoredEmail>, sqlx::Error> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM emails ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, StoredEmail>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find(&self, id: i64) -> Result<Option<StoredEmail>, sqlx::Error> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM emails WHERE id = $1");
        sqlx::query_as::<_, StoredEmail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
