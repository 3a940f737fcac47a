//! Integration tests for the response store backends
//!
//! Every backend must honour the same upsert/list contract, so the checks
//! are written once against `&dyn ResponseStore` and run per backend.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_test::assert_ok;

use survey_wizard::config::DatabaseConfig;
use survey_wizard::error::StorageError;
use survey_wizard::storage::{FileStore, MemoryStore, ResponseRecord, ResponseStore, SqliteStore};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
}

fn record(session: &str, start: DateTime<Utc>, index: usize, answer: Option<&str>) -> ResponseRecord {
    ResponseRecord::new(
        session,
        start,
        index,
        format!("Question {}", index),
        answer.map(str::to_string),
    )
}

async fn check_upsert_is_idempotent(store: &dyn ResponseStore) {
    let r = record("s1", at(0), 0, Some("Ada"));
    assert_ok!(store.upsert(&r).await);
    assert_ok!(store.upsert(&r).await);

    let records = store.list().await.unwrap();
    assert_eq!(records, vec![r]);
}

async fn check_upsert_replaces_answer(store: &dyn ResponseStore) {
    store.upsert(&record("s1", at(0), 1, Some("Red"))).await.unwrap();
    store.upsert(&record("s1", at(0), 1, None)).await.unwrap();
    store.upsert(&record("s1", at(0), 1, Some("Blue"))).await.unwrap();

    let records = store.list_session("s1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].answer.as_deref(), Some("Blue"));
}

async fn check_null_answer_round_trips(store: &dyn ResponseStore) {
    store.upsert(&record("s1", at(0), 2, None)).await.unwrap();
    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].answer, None);
}

async fn check_results_ordering(store: &dyn ResponseStore) {
    // Later session written first, indices out of order
    store.upsert(&record("b-late", at(30), 1, Some("x"))).await.unwrap();
    store.upsert(&record("z-early", at(5), 10, Some("x"))).await.unwrap();
    store.upsert(&record("b-late", at(30), 0, Some("x"))).await.unwrap();
    store.upsert(&record("z-early", at(5), 2, Some("x"))).await.unwrap();
    store.upsert(&record("a-tie", at(30), 0, Some("x"))).await.unwrap();

    let keys: Vec<(String, usize)> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.session_id, r.question_index))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("z-early".to_string(), 2),
            ("z-early".to_string(), 10),
            ("a-tie".to_string(), 0),
            ("b-late".to_string(), 0),
            ("b-late".to_string(), 1),
        ]
    );
}

async fn check_list_session_filters(store: &dyn ResponseStore) {
    store.upsert(&record("s1", at(0), 1, Some("a"))).await.unwrap();
    store.upsert(&record("s2", at(1), 0, Some("b"))).await.unwrap();
    store.upsert(&record("s1", at(0), 0, Some("c"))).await.unwrap();

    let records = store.list_session("s1").await.unwrap();
    let indices: Vec<usize> = records.iter().map(|r| r.question_index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert!(store.list_session("missing").await.unwrap().is_empty());
}

async fn check_empty_store(store: &dyn ResponseStore) {
    assert!(store.list().await.unwrap().is_empty());
}

#[cfg(test)]
mod sqlite_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn create_test_store() -> SqliteStore {
        SqliteStore::new_in_memory()
            .await
            .expect("Failed to create in-memory storage")
    }

    #[tokio::test]
    async fn test_empty() {
        check_empty_store(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        check_upsert_is_idempotent(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_upsert_replaces_answer() {
        check_upsert_replaces_answer(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_null_answer() {
        check_null_answer_round_trips(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_results_ordering() {
        check_results_ordering(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_list_session() {
        check_list_session_filters(&create_test_store().await).await;
    }

    #[tokio::test]
    async fn test_in_memory_pool_never_drops_its_connection() {
        let store = create_test_store().await;
        let options = store.pool().options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        store.upsert(&record("s1", at(0), 0, Some("Ada"))).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_row_per_key() {
        let store = create_test_store().await;
        for answer in ["1", "2", "3"] {
            store.upsert(&record("s1", at(0), 4, Some(answer))).await.unwrap();
        }

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM responses WHERE session_id = 's1' AND question_index = 4",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_on_disk_database_persists() {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("responses.db"),
            max_connections: 2,
        };

        {
            let store = SqliteStore::new(&config).await.unwrap();
            store.upsert(&record("s1", at(0), 0, Some("Ada"))).await.unwrap();
            store.pool().close().await;
        }

        let reopened = SqliteStore::new(&config).await.unwrap();
        let records = reopened.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time, at(0));
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_store(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("responses.json")).expect("Failed to create file store")
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        check_empty_store(&store).await;
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_zero_length_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        std::fs::write(store.path(), "").unwrap();
        check_empty_store(&store).await;
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        check_upsert_is_idempotent(&create_test_store(&dir)).await;
    }

    #[tokio::test]
    async fn test_upsert_replaces_answer() {
        let dir = TempDir::new().unwrap();
        check_upsert_replaces_answer(&create_test_store(&dir)).await;
    }

    #[tokio::test]
    async fn test_null_answer() {
        let dir = TempDir::new().unwrap();
        check_null_answer_round_trips(&create_test_store(&dir)).await;
    }

    #[tokio::test]
    async fn test_results_ordering() {
        let dir = TempDir::new().unwrap();
        check_results_ordering(&create_test_store(&dir)).await;
    }

    #[tokio::test]
    async fn test_list_session() {
        let dir = TempDir::new().unwrap();
        check_list_session_filters(&create_test_store(&dir)).await;
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        create_test_store(&dir)
            .upsert(&record("s1", at(0), 0, Some("Ada")))
            .await
            .unwrap();

        let records = create_test_store(&dir).list().await.unwrap();
        assert_eq!(records, vec![record("s1", at(0), 0, Some("Ada"))]);
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));

        let err = store.upsert(&record("s1", at(0), 0, None)).await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_every_key() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(create_test_store(&dir));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert(&record(&format!("s{}", i), at(0), 0, Some("x")))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 16);
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_empty() {
        check_empty_store(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        check_upsert_is_idempotent(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_upsert_replaces_answer() {
        check_upsert_replaces_answer(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_null_answer() {
        check_null_answer_round_trips(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_results_ordering() {
        check_results_ordering(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_list_session() {
        check_list_session_filters(&MemoryStore::new()).await;
    }
}
