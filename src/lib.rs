//! # Survey Wizard
//!
//! A small web survey that walks each respondent through an ordered catalog
//! of questions, stores one answer per session and question, and lists every
//! stored answer on a results page.
//!
//! ## Features
//!
//! - **Question Catalog**: text, single-choice and integer-scale questions,
//!   built in or loaded from a JSON file
//! - **Navigation**: `Next`/`Back` state machine with mandatory-question checks
//! - **Idempotent Storage**: upsert keyed by `(session_id, question_index)`
//! - **Pluggable Backends**: SQLite, flat JSON file or in-memory
//! - **Results View**: every record sorted by start time, session and question
//!
//! ## Architecture
//!
//! ```text
//! Browser → axum router → Navigator → ResponseStore (SQLite | file | memory)
//!                ↓
//!          SessionStore (token → SessionState)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use survey_wizard::{AppState, Catalog, Config, SurveyServer};
//! use survey_wizard::storage::open_store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = open_store(&config.storage).await?;
//!     let addr = config.server.bind_addr;
//!     let state = Arc::new(AppState::new(config, Catalog::builtin(), store));
//!     SurveyServer::new(state).run(addr).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Question definitions and the ordered catalog.
pub mod catalog;
/// Configuration management for the server.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// HTTP routes, rendering and shared state.
pub mod server;
/// Response persistence backends.
pub mod storage;
/// Sessions, navigation and results.
pub mod survey;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, SharedState, SurveyServer};
