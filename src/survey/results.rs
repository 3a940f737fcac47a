//! Results listing across all sessions.

use tracing::error;

use crate::storage::{ResponseRecord, ResponseStore};

/// Message shown when there is nothing to list.
pub const NO_RESPONSES_MESSAGE: &str = "No responses available.";

/// Everything stored so far, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Results {
    /// Store is empty, absent or unreadable.
    Empty,
    /// Records sorted by start time, session and question index.
    Records(Vec<ResponseRecord>),
}

impl Results {
    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        matches!(self, Results::Empty)
    }
}

/// Read every record from the store.
///
/// A read failure is logged and reported the same way as an empty store.
pub async fn collect_results(store: &dyn ResponseStore) -> Results {
    match store.list().await {
        Ok(records) if records.is_empty() => Results::Empty,
        Ok(records) => Results::Records(records),
        Err(e) => {
            error!(error = %e, backend = store.backend_name(), "Failed to read responses");
            Results::Empty
        }
    }
}
