use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Survey error: {0}")]
    Survey(#[from] SurveyError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed response store {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Errors raised while walking a respondent through the catalog
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurveyError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session {session_id} already finished the survey")]
    SessionFinished { session_id: String },

    #[error("Question index {index} out of range (catalog has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Question catalog construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog must contain at least one question")]
    Empty,

    #[error("Question {index} has a blank prompt")]
    BlankPrompt { index: usize },

    #[error("Duplicate question prompt: {prompt}")]
    DuplicatePrompt { prompt: String },

    #[error("Choice question '{prompt}' has no options")]
    NoOptions { prompt: String },

    #[error("Choice question '{prompt}' has a blank, padded or duplicate option '{option}'")]
    InvalidOption { prompt: String, option: String },

    #[error("Range question '{prompt}' has min {min} greater than max {max}")]
    InvalidRange { prompt: String, min: i64, max: i64 },

    #[error("Range question '{prompt}' spans more than {limit} values")]
    RangeTooWide { prompt: String, limit: i64 },

    #[error("Failed to load catalog: {message}")]
    Load { message: String },
}

impl SurveyError {
    /// Shorthand for a validation failure with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        SurveyError::Validation {
            message: message.into(),
        }
    }
}

/// Map errors onto HTTP responses.
///
/// Session errors send the respondent back into the flow; everything else
/// is a plain-text failure that does not leak internal details.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Survey(SurveyError::Validation { message }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            AppError::Survey(SurveyError::SessionNotFound) => Redirect::to("/").into_response(),
            AppError::Survey(SurveyError::SessionFinished { .. }) => {
                Redirect::to("/done").into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.",
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for navigation operations
pub type SurveyResult<T> = Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "bad backend".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: bad backend");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Connection {
            message: "failed to connect".to_string(),
        };
        assert_eq!(err.to_string(), "Database connection failed: failed to connect");

        let err = StorageError::Malformed {
            path: "responses.json".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed response store responses.json: expected value"
        );

        let err = StorageError::Migration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: version mismatch");
    }

    #[test]
    fn test_survey_error_display() {
        let err = SurveyError::validation("This is a required question.");
        assert_eq!(err.to_string(), "This is a required question.");

        let err = SurveyError::IndexOutOfRange { index: 7, len: 6 };
        assert_eq!(
            err.to_string(),
            "Question index 7 out of range (catalog has 6 questions)"
        );
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::DuplicatePrompt {
            prompt: "Name?".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate question prompt: Name?");

        let err = CatalogError::InvalidRange {
            prompt: "Mood?".to_string(),
            min: 6,
            max: 1,
        };
        assert_eq!(
            err.to_string(),
            "Range question 'Mood?' has min 6 greater than max 1"
        );
    }

    #[test]
    fn test_error_conversions_to_app_error() {
        let app_err: AppError = StorageError::Query {
            message: "x".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Storage(_)));

        let app_err: AppError = SurveyError::SessionNotFound.into();
        assert!(matches!(app_err, AppError::Survey(_)));

        let app_err: AppError = CatalogError::Empty.into();
        assert!(matches!(app_err, AppError::Catalog(_)));
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::from(SurveyError::validation("bad")).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = AppError::from(SurveyError::SessionNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/");

        let resp = AppError::from(SurveyError::SessionFinished {
            session_id: "s".to_string(),
        })
        .into_response();
        assert_eq!(resp.headers()["location"], "/done");

        let resp = AppError::from(StorageError::Query {
            message: "disk full".to_string(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
