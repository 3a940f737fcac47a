use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{sort_for_results, ResponseRecord, ResponseStore};
use crate::error::StorageResult;

/// In-process response store. Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(String, usize), ResponseRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn upsert(&self, record: &ResponseRecord) -> StorageResult<()> {
        let mut records = self.records.write().await;
        records
            .entry((record.session_id.clone(), record.question_index))
            .and_modify(|existing| existing.answer = record.answer.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ResponseRecord>> {
        let mut records: Vec<ResponseRecord> =
            self.records.read().await.values().cloned().collect();
        sort_for_results(&mut records);
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
