//! Error types shared by the store, the engine and the transport layer.

use serde::Serialize;
use thiserror::Error;

use crate::domain::QuestionId;

/// Errors raised while reading or validating the question store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read question store '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("question store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question store is malformed: {0}")]
    Invalid(String),
    #[error("question store was not loaded")]
    NotLoaded,
}

/// Outcomes of engine operations that are not a plain success.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("question store unavailable: {0}")]
    DataUnavailable(#[from] StoreError),
    #[error("question {question_id} must be answered before moving on")]
    AnswerRequired { question_id: QuestionId },
    #[error("answer value {value} is outside 1..=5")]
    InvalidAnswerValue { value: i64 },
    #[error("unknown question id {0}")]
    UnknownQuestion(QuestionId),
    #[error("invalid locale code '{0}'")]
    InvalidLocale(String),
    #[error("quiz already finished; retry to start again")]
    Finished,
    #[error("quiz has not been started")]
    NotStarted,
}

/// User-facing error categories handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataUnavailable,
    AnswerRequired,
}

impl QuizError {
    /// The user-facing category, if this error is meant to be shown to the user at all.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            QuizError::DataUnavailable(_) => Some(ErrorKind::DataUnavailable),
            QuizError::AnswerRequired { .. } => Some(ErrorKind::AnswerRequired),
            _ => None,
        }
    }
}
