//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{info, warn, instrument};

use crate::domain::Locale;
use crate::error::QuizError;
use crate::i18n::{self, MessageKey};
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, store_loaded: state.store.is_some() })
}

#[instrument(level = "info", skip(state), fields(locale = ?q.locale))]
pub async fn http_get_questions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LocaleQuery>,
) -> Response {
  let locale = state.locale_for(q.locale.as_ref());
  match list_questions(&state, &locale) {
    Ok(out) => {
      info!(target: "sunmoon_quiz", locale = %out.locale, count = out.questions.len(), "HTTP questions served");
      Json(out).into_response()
    }
    Err(e) => error_response(&locale, &e),
  }
}

#[instrument(level = "info", skip(state), fields(locale = ?q.locale))]
pub async fn http_get_messages(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LocaleQuery>,
) -> impl IntoResponse {
  let locale = state.locale_for(q.locale.as_ref());
  let messages = i18n::messages(&locale);
  Json(MessagesOut { locale, messages })
}

#[instrument(level = "info", skip(state, body), fields(locale = ?body.locale, answered = body.answers.len()))]
pub async fn http_post_result(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ResultIn>,
) -> Response {
  let locale = state.locale_for(body.locale.as_ref());
  match score_answers(&state, &locale, &body.answers) {
    Ok(result) => {
      info!(target: "quiz", %locale, sun = result.sun_percent, moon = result.moon_percent, verdict = ?result.verdict, "HTTP result scored");
      Json(result).into_response()
    }
    Err(e) => error_response(&locale, &e),
  }
}

/// Map an engine error onto a status code and a localized body.
fn error_response(locale: &Locale, e: &QuizError) -> Response {
  let (status, message) = match e {
    QuizError::DataUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, i18n::t(locale, MessageKey::ErrorLoading).to_string()),
    QuizError::AnswerRequired { .. } => (StatusCode::UNPROCESSABLE_ENTITY, i18n::t(locale, MessageKey::PleaseAnswer).to_string()),
    _ => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
  };
  let question_id = match e {
    QuizError::AnswerRequired { question_id } | QuizError::UnknownQuestion(question_id) => Some(*question_id),
    _ => None,
  };
  warn!(target: "sunmoon_quiz", %status, error = %e, "HTTP request rejected");
  (status, Json(ErrorOut { kind: e.kind(), question_id, message })).into_response()
}
