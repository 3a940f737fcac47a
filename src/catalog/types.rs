//! Question definitions and answer coercion.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SurveyError, SurveyResult};

/// A single question in the catalog.
///
/// The prompt doubles as the question's key, so it must be unique within
/// a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Text shown to the respondent.
    pub prompt: String,
    /// Whether forward navigation is blocked until an answer is given.
    #[serde(default)]
    pub mandatory: bool,
    /// Input kind and its parameters.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The closed set of question input kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// Pick one of a fixed set of options.
    Choice {
        /// Allowed answers, in display order.
        options: Vec<String>,
    },
    /// Integer on an inclusive scale.
    Range {
        /// Lowest allowed value.
        min: i64,
        /// Highest allowed value.
        max: i64,
        /// Label rendered next to the low end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_label: Option<String>,
        /// Label rendered next to the high end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_label: Option<String>,
    },
}

/// A coerced, non-empty answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Trimmed text (text and choice questions).
    Text(String),
    /// Parsed integer (range questions).
    Integer(i64),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(s) => write!(f, "{}", s),
            Answer::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl QuestionKind {
    /// Lowercase kind name, as used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Choice { .. } => "choice",
            QuestionKind::Range { .. } => "range",
        }
    }
}

impl Question {
    /// Create an optional free-text question.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mandatory: false,
            kind: QuestionKind::Text,
        }
    }

    /// Create an optional single-choice question.
    pub fn choice<I, S>(prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            mandatory: false,
            kind: QuestionKind::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Create an optional integer-scale question.
    pub fn range(prompt: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            prompt: prompt.into(),
            mandatory: false,
            kind: QuestionKind::Range {
                min,
                max,
                min_label: None,
                max_label: None,
            },
        }
    }

    /// Mark the question as mandatory.
    pub fn required(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Attach end labels to a range question. No effect on other kinds.
    pub fn with_labels(mut self, low: impl Into<String>, high: impl Into<String>) -> Self {
        if let QuestionKind::Range {
            min_label,
            max_label,
            ..
        } = &mut self.kind
        {
            *min_label = Some(low.into());
            *max_label = Some(high.into());
        }
        self
    }

    /// Coerce raw submitted text into a stored answer.
    ///
    /// Input is trimmed and an empty submission becomes `None` for every kind.
    /// Range answers must parse as an integer within bounds and choice answers
    /// must match one of the options exactly.
    pub fn coerce(&self, raw: &str) -> SurveyResult<Option<Answer>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match &self.kind {
            QuestionKind::Text => Ok(Some(Answer::Text(trimmed.to_string()))),
            QuestionKind::Choice { options } => {
                if options.iter().any(|o| o == trimmed) {
                    Ok(Some(Answer::Text(trimmed.to_string())))
                } else {
                    Err(SurveyError::validation(format!(
                        "Please choose one of: {}.",
                        options.join(", ")
                    )))
                }
            }
            QuestionKind::Range { min, max, .. } => {
                let value: i64 = trimmed.parse().map_err(|_| {
                    SurveyError::validation(format!(
                        "Please enter a whole number between {} and {}.",
                        min, max
                    ))
                })?;
                if value < *min || value > *max {
                    return Err(SurveyError::validation(format!(
                        "Please enter a whole number between {} and {}.",
                        min, max
                    )));
                }
                Ok(Some(Answer::Integer(value)))
            }
        }
    }
}
