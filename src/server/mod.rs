//! HTTP server for the survey wizard.
//!
//! This module provides:
//! - Shared application state (catalog, navigator, session store)
//! - Route handlers for the question flow and results page
//! - Session token extraction and cookie handling
//! - HTML rendering of the pages

mod render;
mod routes;
mod session;

pub use render::*;
pub use routes::router;
pub use session::{clear_cookie, session_cookie, SessionToken};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::storage::SharedStore;
use crate::survey::{MemorySessionStore, Navigator, SessionStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Navigation controller over the catalog and response store.
    pub navigator: Navigator,
    /// Server-side respondent sessions.
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Create state with an in-memory session store sized from config.
    pub fn new(config: Config, catalog: Catalog, store: SharedStore) -> Self {
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.session.ttl_secs,
        )));
        Self::with_sessions(config, catalog, store, sessions)
    }

    /// Create state with an explicit session store.
    pub fn with_sessions(
        config: Config,
        catalog: Catalog,
        store: SharedStore,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        info!(
            questions = catalog.len(),
            backend = store.backend_name(),
            "AppState initializing"
        );
        Self {
            config,
            navigator: Navigator::new(Arc::new(catalog), store),
            sessions,
        }
    }

    /// The question catalog.
    pub fn catalog(&self) -> &Catalog {
        self.navigator.catalog()
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

/// HTTP front end bound to a socket.
pub struct SurveyServer {
    state: SharedState,
}

impl SurveyServer {
    /// Create a new server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve until ctrl-c.
    pub async fn run(&self, addr: SocketAddr) -> AppResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Failed to bind {}: {}", addr, e),
            })?;
        info!(%addr, "Survey server listening");

        let app = router(Arc::clone(&self.state));
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Server error: {}", e),
            })
    }
}
