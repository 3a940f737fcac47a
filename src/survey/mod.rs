//! Survey flow: respondent sessions, navigation and results.
//!
//! This module provides:
//! - `SessionState` / `SessionStore`: per-respondent progress, keyed by token
//! - `Navigator`: the `Next`/`Back` state machine over the catalog
//! - `collect_results`: the sorted listing of everything stored

mod navigator;
mod results;
mod session;

pub use navigator::{Action, Navigator, Outcome, REQUIRED_MESSAGE};
pub use results::{collect_results, Results, NO_RESPONSES_MESSAGE};
pub use session::{MemorySessionStore, SessionState, SessionStore};
