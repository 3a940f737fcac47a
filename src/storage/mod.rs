//! Storage layer for survey responses.
//!
//! Every backend implements the same `ResponseStore` contract: one record per
//! `(session_id, question_index)`, upserted on every submission and never
//! deleted. The backend is picked once at startup from configuration.

mod file;
mod memory;
mod sqlite;


pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageResult;

/// One stored answer: what a session answered for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Opaque session token.
    pub session_id: String,
    /// When the session was started.
    pub start_time: DateTime<Utc>,
    /// Zero-based position of the question in the catalog.
    pub question_index: usize,
    /// Prompt of the question at that position.
    pub question_prompt: String,
    /// Stored answer text; `None` means seen but unanswered.
    pub answer: Option<String>,
}

impl ResponseRecord {
    /// Create a record for a session's answer to a question.
    pub fn new(
        session_id: impl Into<String>,
        start_time: DateTime<Utc>,
        question_index: usize,
        question_prompt: impl Into<String>,
        answer: Option<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            start_time,
            question_index,
            question_prompt: question_prompt.into(),
            answer,
        }
    }

    /// Natural key of the record.
    pub fn key(&self) -> (&str, usize) {
        (&self.session_id, self.question_index)
    }

    /// Whether `other` shares this record's natural key.
    pub fn same_key(&self, other: &ResponseRecord) -> bool {
        self.key() == other.key()
    }

    /// Results ordering: start time, then session, then question index.
    pub fn results_order(&self, other: &ResponseRecord) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then_with(|| self.session_id.cmp(&other.session_id))
            .then_with(|| self.question_index.cmp(&other.question_index))
    }
}

/// Sort records into results order in place.
pub fn sort_for_results(records: &mut [ResponseRecord]) {
    records.sort_by(|a, b| a.results_order(b));
}

/// Fixed-width timestamp encoding so textual ordering matches time ordering.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Persistence contract shared by every response backend.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Insert the record, or replace the answer of the record with the same
    /// `(session_id, question_index)`. Safe to repeat with identical input.
    async fn upsert(&self, record: &ResponseRecord) -> StorageResult<()>;

    /// All records in results order.
    async fn list(&self) -> StorageResult<Vec<ResponseRecord>>;

    /// One session's records in question order.
    async fn list_session(&self, session_id: &str) -> StorageResult<Vec<ResponseRecord>> {
        let mut records: Vec<ResponseRecord> = self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.session_id == session_id)
            .collect();
        records.sort_by_key(|r| r.question_index);
        Ok(records)
    }

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured backend.
pub type SharedStore = Arc<dyn ResponseStore>;

/// Open the backend selected by configuration.
pub async fn open_store(config: &StorageConfig) -> StorageResult<SharedStore> {
    let store: SharedStore = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::new(&config.database).await?),
        StorageBackend::File => Arc::new(FileStore::new(&config.file_path)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!(backend = store.backend_name(), "Response store ready");
    Ok(store)
}
