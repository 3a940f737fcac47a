//! Question catalog: the ordered, immutable list of survey questions.
//!
//! This module provides:
//! - `Question` / `QuestionKind`: a shared `{prompt, mandatory}` envelope over
//!   the closed set of input kinds
//! - `Catalog`: validated ordered list, loaded once at startup
//! - Built-in default questions

mod builtins;
mod types;

pub use builtins::default_questions;
pub use types::*;

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::CatalogError;

/// Largest number of values a range question may offer.
pub const MAX_RANGE_SPAN: i64 = 100;

/// Validated, ordered list of questions.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, blank or duplicate prompts,
    /// choice questions without usable options, and inverted or oversized ranges.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, q) in questions.iter().enumerate() {
            if q.prompt.trim().is_empty() {
                return Err(CatalogError::BlankPrompt { index });
            }
            if !seen.insert(q.prompt.as_str()) {
                return Err(CatalogError::DuplicatePrompt {
                    prompt: q.prompt.clone(),
                });
            }
            match &q.kind {
                QuestionKind::Choice { options } if options.is_empty() => {
                    return Err(CatalogError::NoOptions {
                        prompt: q.prompt.clone(),
                    });
                }
                QuestionKind::Choice { options } => {
                    // Submitted values are trimmed before matching
                    let mut seen_options = HashSet::new();
                    for option in options {
                        if option.trim().is_empty()
                            || option.trim() != option.as_str()
                            || !seen_options.insert(option.as_str())
                        {
                            return Err(CatalogError::InvalidOption {
                                prompt: q.prompt.clone(),
                                option: option.clone(),
                            });
                        }
                    }
                }
                QuestionKind::Range { min, max, .. } if min > max => {
                    return Err(CatalogError::InvalidRange {
                        prompt: q.prompt.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                QuestionKind::Range { min, max, .. }
                    if i128::from(*max) - i128::from(*min) >= i128::from(MAX_RANGE_SPAN) =>
                {
                    return Err(CatalogError::RangeTooWide {
                        prompt: q.prompt.clone(),
                        limit: MAX_RANGE_SPAN,
                    });
                }
                _ => {}
            }
        }

        Ok(Self { questions })
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            questions: default_questions(),
        }
    }

    /// Parse a catalog from a JSON array of questions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> =
            serde_json::from_str(json).map_err(|e| CatalogError::Load {
                message: e.to_string(),
            })?;
        Self::new(questions)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Load {
            message: format!("{}: {}", path.display(), e),
        })?;
        let catalog = Self::from_json(&raw)?;
        info!(path = %path.display(), questions = catalog.len(), "Question catalog loaded");
        Ok(catalog)
    }

    /// Get the question at `index`.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the final question.
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    /// Iterate questions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
