//! Flat-file response store.
//!
//! All records live in a single JSON document. An upsert reads the whole
//! file, patches it in memory and writes it back through a temporary file
//! that is renamed over the original. Writers inside the process are
//! serialized by a mutex; separate processes sharing the file are not.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::{sort_for_results, ResponseRecord, ResponseStore};
use crate::error::{StorageError, StorageResult};

/// JSON-file-backed response store
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`. The file itself is created on first write.
    pub fn new(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StorageResult<Vec<ResponseRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    async fn write_all(&self, records: &[ResponseRecord]) -> StorageResult<()> {
        let body = serde_json::to_vec_pretty(records).map_err(|e| StorageError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StorageError::Io {
                path: tmp.display().to_string(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io {
                path: self.path.display().to_string(),
                source: e,
            })
    }
}

#[async_trait]
impl ResponseStore for FileStore {
    async fn upsert(&self, record: &ResponseRecord) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_all().await?;
        match records.iter_mut().find(|r| r.same_key(record)) {
            Some(existing) => existing.answer = record.answer.clone(),
            None => records.push(record.clone()),
        }
        self.write_all(&records).await?;

        debug!(
            path = %self.path.display(),
            session_id = %record.session_id,
            question_index = record.question_index,
            "Response upserted"
        );
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ResponseRecord>> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_all().await?;
        sort_for_results(&mut records);
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
