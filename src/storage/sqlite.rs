use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::{encode_timestamp, ResponseRecord, ResponseStore};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed response store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        info!(path = %config.path.display(), "Database opened");

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create a private in-memory database, mainly for tests.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        // Every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ResponseStore for SqliteStore {
    async fn upsert(&self, record: &ResponseRecord) -> StorageResult<()> {
        let question_index =
            i64::try_from(record.question_index).map_err(|_| StorageError::Query {
                message: format!("Question index {} does not fit in INTEGER", record.question_index),
            })?;

        sqlx::query(
            r#"
            INSERT INTO responses (session_id, start_time, question_index, question_prompt, answer)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (session_id, question_index) DO UPDATE SET
                answer = excluded.answer
            "#,
        )
        .bind(&record.session_id)
        .bind(encode_timestamp(&record.start_time))
        .bind(question_index)
        .bind(&record.question_prompt)
        .bind(&record.answer)
        .execute(&self.pool)
        .await?;

        debug!(
            session_id = %record.session_id,
            question_index = record.question_index,
            "Response upserted"
        );
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ResponseRecord>> {
        let rows: Vec<ResponseRow> = sqlx::query_as(
            r#"
            SELECT session_id, start_time, question_index, question_prompt, answer
            FROM responses
            ORDER BY start_time ASC, session_id ASC, question_index ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResponseRecord::try_from).collect()
    }

    async fn list_session(&self, session_id: &str) -> StorageResult<Vec<ResponseRecord>> {
        let rows: Vec<ResponseRow> = sqlx::query_as(
            r#"
            SELECT session_id, start_time, question_index, question_prompt, answer
            FROM responses
            WHERE session_id = ?
            ORDER BY question_index ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResponseRecord::try_from).collect()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

// Internal row type for SQLx mapping
#[derive(sqlx::FromRow)]
struct ResponseRow {
    session_id: String,
    start_time: String,
    question_index: i64,
    question_prompt: String,
    answer: Option<String>,
}

impl TryFrom<ResponseRow> for ResponseRecord {
    type Error = StorageError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let start_time = DateTime::parse_from_rfc3339(&row.start_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Query {
                message: format!("Bad start_time '{}': {}", row.start_time, e),
            })?;
        let question_index =
            usize::try_from(row.question_index).map_err(|_| StorageError::Query {
                message: format!("Negative question_index {}", row.question_index),
            })?;

        Ok(Self {
            session_id: row.session_id,
            start_time,
            question_index,
            question_prompt: row.question_prompt,
            answer: row.answer,
        })
    }
}
