//! Respondent session state and the store that holds it between requests.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Answer;

/// One respondent's progress through the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Opaque token identifying the session.
    pub session_id: String,
    /// Fixed when the session is created.
    pub start_time: DateTime<Utc>,
    /// Zero-based index of the question being shown.
    pub current_index: usize,
    /// Set once `Next` is taken on the final question.
    pub done: bool,
    /// Answers given so far, keyed by question prompt.
    pub answers: HashMap<String, Option<Answer>>,
}

impl SessionState {
    /// Start a fresh session at the first question.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            // Microsecond precision survives every storage backend unchanged
            start_time: Utc::now().trunc_subsecs(6),
            current_index: 0,
            done: false,
            answers: HashMap::new(),
        }
    }

    /// Answer currently held for `prompt`, if any.
    pub fn answer_for(&self, prompt: &str) -> Option<&Answer> {
        self.answers.get(prompt).and_then(|a| a.as_ref())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-side key-value store of sessions, keyed by token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session.
    async fn get(&self, session_id: &str) -> Option<SessionState>;
    /// Insert or replace a session.
    async fn put(&self, state: SessionState);
    /// Drop a session; unknown tokens are ignored.
    async fn remove(&self, session_id: &str);
}

/// In-process session store with idle expiry.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, (SessionState, Instant)>>,
}

impl MemorySessionStore {
    /// Sessions untouched for longer than `ttl` are dropped.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sessions currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are held.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove every expired session, returning how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, touched)| now.duration_since(*touched) <= self.ttl);
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, "Expired sessions swept");
        }
        dropped
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sweep().await;
        let mut sessions = self.sessions.write().await;
        let (state, touched) = sessions.get_mut(session_id)?;
        *touched = Instant::now();
        Some(state.clone())
    }

    async fn put(&self, state: SessionState) {
        self.sweep().await;
        self.sessions
            .write()
            .await
            .insert(state.session_id.clone(), (state, Instant::now()));
    }

    async fn remove(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let a = SessionState::new();
        let b = SessionState::new();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.current_index, 0);
        assert!(!a.done);
        assert!(a.answers.is_empty());
        assert_eq!(a.start_time.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_answer_for() {
        let mut state = SessionState::new();
        state.answers.insert("Name?".to_string(), Some(Answer::Text("Ada".to_string())));
        state.answers.insert("Color?".to_string(), None);

        assert_eq!(state.answer_for("Name?"), Some(&Answer::Text("Ada".to_string())));
        assert_eq!(state.answer_for("Color?"), None);
        assert_eq!(state.answer_for("Pet?"), None);
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let mut state = SessionState::new();
        state.current_index = 3;
        store.put(state.clone()).await;

        assert_eq!(store.get(&state.session_id).await, Some(state.clone()));

        store.remove(&state.session_id).await;
        assert!(store.get(&state.session_id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        assert!(store.get("nope").await.is_none());
        store.remove("nope").await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let state = SessionState::new();
        store.put(state.clone()).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(&state.session_id).await.is_some());

        // The read above refreshed the idle timer
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(&state.session_id).await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get(&state.session_id).await.is_none());
        assert_eq!(store.len().await, 0);
    }
}
