//! Question navigation state machine.
//!
//! A session sits on one question index at a time, or in the terminal done
//! state. `Next` validates and persists before moving forward; `Back` persists
//! whatever is worth keeping and moves one step toward the first question.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use super::session::SessionState;
use crate::catalog::{Answer, Catalog, Question};
use crate::error::{AppResult, SurveyError, SurveyResult};
use crate::storage::{ResponseRecord, SharedStore};

/// Message shown when a mandatory question is left blank.
pub const REQUIRED_MESSAGE: &str =
    "This is a required question. Please enter a response before you can move on.";

/// Navigation requested by the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Validate, store and move forward.
    Next,
    /// Store what is worth keeping and move back.
    Back,
}

impl FromStr for Action {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next" => Ok(Action::Next),
            "back" => Ok(Action::Back),
            other => Err(SurveyError::validation(format!("Unknown action: {}", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Next => write!(f, "Next"),
            Action::Back => write!(f, "Back"),
        }
    }
}

/// Where a submission left the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Now positioned on this question index.
    Question(usize),
    /// The last question was answered.
    Done,
    /// Submission refused; the session stays on the same question.
    Rejected {
        /// User-facing reason.
        message: String,
    },
}

/// Applies submissions to session state and persists answers.
#[derive(Clone)]
pub struct Navigator {
    catalog: Arc<Catalog>,
    store: SharedStore,
}

impl Navigator {
    /// Create a navigator over a catalog and response store.
    pub fn new(catalog: Arc<Catalog>, store: SharedStore) -> Self {
        Self { catalog, store }
    }

    /// The question catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The response store answers are written to.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Question the session is currently positioned on.
    pub fn current_question(&self, state: &SessionState) -> SurveyResult<&Question> {
        if state.done {
            return Err(SurveyError::SessionFinished {
                session_id: state.session_id.clone(),
            });
        }
        self.catalog
            .get(state.current_index)
            .ok_or(SurveyError::IndexOutOfRange {
                index: state.current_index,
                len: self.catalog.len(),
            })
    }

    /// Apply `action` with the raw submitted text.
    ///
    /// The index only moves after the answer has been stored, so a storage
    /// failure is returned with the session still on the same question.
    pub async fn submit(
        &self,
        state: &mut SessionState,
        action: Action,
        raw_answer: &str,
    ) -> AppResult<Outcome> {
        let index = state.current_index;
        let question = self.current_question(state)?;

        let answer = match question.coerce(raw_answer) {
            Ok(answer) => answer,
            Err(SurveyError::Validation { message }) => {
                debug!(session_id = %state.session_id, index, %message, "Answer rejected");
                return Ok(Outcome::Rejected { message });
            }
            Err(other) => return Err(other.into()),
        };

        match action {
            Action::Next => {
                if question.mandatory && answer.is_none() {
                    state.answers.insert(question.prompt.clone(), None);
                    debug!(session_id = %state.session_id, index, "Mandatory question left blank");
                    return Ok(Outcome::Rejected {
                        message: REQUIRED_MESSAGE.to_string(),
                    });
                }

                state.answers.insert(question.prompt.clone(), answer.clone());
                self.persist(state, index, question, answer).await?;

                if index >= self.catalog.last_index() {
                    state.done = true;
                    info!(session_id = %state.session_id, "Survey completed");
                    Ok(Outcome::Done)
                } else {
                    state.current_index = index + 1;
                    Ok(Outcome::Question(state.current_index))
                }
            }
            Action::Back => {
                state.answers.insert(question.prompt.clone(), answer.clone());
                // Optional blanks are stored as "seen but unanswered"
                if answer.is_some() || !question.mandatory {
                    self.persist(state, index, question, answer).await?;
                }

                state.current_index = index.saturating_sub(1);
                Ok(Outcome::Question(state.current_index))
            }
        }
    }

    async fn persist(
        &self,
        state: &SessionState,
        index: usize,
        question: &Question,
        answer: Option<Answer>,
    ) -> AppResult<()> {
        let record = ResponseRecord::new(
            state.session_id.clone(),
            state.start_time,
            index,
            question.prompt.clone(),
            answer.map(|a| a.to_string()),
        );
        self.store.upsert(&record).await?;
        Ok(())
    }
}
