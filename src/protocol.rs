//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Locale, Question, QuestionId, QuizResult};
use crate::error::ErrorKind;
use crate::presenter::{NextTrigger, RenderedQuestion};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Start {
        #[serde(default)]
        locale: Option<Locale>,
    },
    Answer {
        #[serde(rename = "questionId")]
        question_id: QuestionId,
        value: i64,
    },
    /// Both the "next" button and the Enter key.
    Next {
        #[serde(default)]
        trigger: NextTrigger,
    },
    Back,
    Retry,
    SetLocale {
        locale: Locale,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Question {
        question: RenderedQuestion,
        #[serde(rename = "currentAnswer")]
        current_answer: Option<u8>,
    },
    Navigation {
        #[serde(rename = "canGoBack")]
        can_go_back: bool,
        #[serde(rename = "nextLabel")]
        next_label: String,
    },
    Result {
        result: QuizResult,
    },
    /// `kind` is absent for protocol defects (bad JSON, out-of-range values).
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<ErrorKind>,
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<Locale>,
}

/// DTO for a question in the plain question list.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: QuestionId,
    pub text: String,
    pub category: Category,
}

impl From<&Question> for QuestionOut {
    fn from(q: &Question) -> Self {
        Self { id: q.id, text: q.text.clone(), category: q.category }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionsOut {
    pub locale: Locale,
    pub questions: Vec<QuestionOut>,
}

#[derive(Debug, Serialize)]
pub struct MessagesOut {
    pub locale: Locale,
    pub messages: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Deserialize)]
pub struct ResultIn {
    #[serde(default)]
    pub locale: Option<Locale>,
    pub answers: BTreeMap<QuestionId, i64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(rename = "questionId", skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    #[serde(rename = "storeLoaded")]
    pub store_loaded: bool,
}
