//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Listing localized questions
//!   - Scoring a complete answer map in one shot, through the same session rules the
//!     WebSocket flow uses

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::domain::{Locale, QuestionId, QuizResult};
use crate::error::{QuizError, StoreError};
use crate::protocol::{QuestionOut, QuestionsOut};
use crate::session::{Advance, Session};
use crate::state::AppState;

#[instrument(level = "info", skip_all, fields(%locale))]
pub fn list_questions(state: &AppState, locale: &Locale) -> Result<QuestionsOut, QuizError> {
  let store = state.store.as_ref().ok_or(StoreError::NotLoaded)?;
  let locale = store.resolve_locale(locale);
  let questions = store.questions(&locale).iter().map(QuestionOut::from).collect();
  Ok(QuestionsOut { locale, questions })
}

/// Record every answer, then walk the session forward to the result. A gap surfaces as
/// `AnswerRequired` for the first unanswered question.
#[instrument(level = "info", skip_all, fields(%locale, answered = answers.len()))]
pub fn score_answers(state: &AppState, locale: &Locale, answers: &BTreeMap<QuestionId, i64>) -> Result<QuizResult, QuizError> {
  let store = state.store.clone().ok_or(StoreError::NotLoaded)?;
  let mut session = Session::load(store, locale);
  for (&id, &value) in answers {
    session.record_answer(id, value)?;
  }
  debug!(target: "quiz", recorded = session.answers().len(), total = session.questions().len(), "Answers recorded");
  loop {
    match session.advance()? {
      Advance::Moved { index } => debug!(target: "quiz", index, "Scoring walk"),
      Advance::Finished(result) => return Ok(result),
    }
  }
}
