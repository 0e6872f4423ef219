//! Presentation boundary: the callbacks a rendering surface implements and the controller
//! that turns UI events into session operations and paints the outcome back.
//!
//! The "next" button and the Enter key both arrive as `next` and share the same
//! `Session::advance` validation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::{Category, Locale, Question, QuestionId, QuizResult, Score};
use crate::error::{ErrorKind, QuizError};
use crate::i18n::{self, MessageKey};
use crate::session::{Advance, Session};
use crate::store::QuestionStore;

/// Question as the presentation surface draws it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedQuestion {
  pub id: QuestionId,
  /// 1-based position.
  pub number: usize,
  pub total: usize,
  pub title: String,
  pub text: String,
  pub category: Category,
}

impl RenderedQuestion {
  pub fn new(question: &Question, index: usize, total: usize) -> Self {
    let number = index + 1;
    Self {
      id: question.id,
      number,
      total,
      title: format!("{}. {}", number, question.text),
      text: question.text.clone(),
      category: question.category,
    }
  }
}

/// Callbacks implemented by whatever paints the quiz.
pub trait QuizPresenter {
  fn on_question_rendered(&mut self, question: &RenderedQuestion, current_answer: Option<Score>);
  fn on_navigation_state_changed(&mut self, can_go_back: bool, next_label: &str);
  fn on_result(&mut self, result: &QuizResult);
  fn on_error(&mut self, kind: ErrorKind, message: &str);
}

/// Where a `next` came from. Only used for logging; both go through `advance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextTrigger {
  #[default]
  Button,
  EnterKey,
}

pub struct QuizController<P> {
  store: Option<Arc<QuestionStore>>,
  locale: Locale,
  session: Option<Session>,
  presenter: P,
}

impl<P: QuizPresenter> QuizController<P> {
  /// `store` is `None` when the question store failed to load.
  pub fn new(store: Option<Arc<QuestionStore>>, locale: Locale, presenter: P) -> Self {
    Self { store, locale, session: None, presenter }
  }

  pub fn presenter_mut(&mut self) -> &mut P { &mut self.presenter }
  pub fn session(&self) -> Option<&Session> { self.session.as_ref() }
  pub fn locale(&self) -> &Locale { &self.locale }

  /// Build the session and paint the first question, or report that the store is missing.
  pub fn start(&mut self) {
    let Some(store) = self.store.clone() else {
      error!(target: "quiz", locale = %self.locale, "Quiz start without a question store");
      self.report(ErrorKind::DataUnavailable);
      return;
    };
    let session = Session::load(store, &self.locale);
    info!(target: "quiz", locale = %session.locale(), questions = session.questions().len(), "Quiz started");
    self.session = Some(session);
    self.render();
  }

  /// Record a selection for `question_id`. Invalid values are returned to the caller as
  /// defects; they are never shown as prompts.
  pub fn answer(&mut self, question_id: QuestionId, value: i64) -> Result<(), QuizError> {
    let session = self.session_mut()?;
    match session.record_answer(question_id, value) {
      Ok(_) => Ok(()),
      Err(QuizError::Finished) => {
        debug!(target: "quiz", question_id, "Answer ignored: quiz finished");
        Ok(())
      }
      Err(e) => {
        warn!(target: "quiz", question_id, value, error = %e, "Answer rejected");
        Err(e)
      }
    }
  }

  pub fn next(&mut self, trigger: NextTrigger) -> Result<(), QuizError> {
    let session = self.session_mut()?;
    match session.advance() {
      Ok(Advance::Moved { index }) => {
        debug!(target: "quiz", index, ?trigger, "Advanced");
        self.render();
      }
      Ok(Advance::Finished(result)) => {
        debug!(target: "quiz", ?trigger, "Finished");
        self.presenter.on_result(&result);
      }
      Err(QuizError::AnswerRequired { question_id }) => {
        debug!(target: "quiz", question_id, ?trigger, "Advance blocked: answer required");
        self.report(ErrorKind::AnswerRequired);
      }
      Err(QuizError::Finished) => debug!(target: "quiz", ?trigger, "Advance ignored: quiz finished"),
      Err(e) => return Err(e),
    }
    Ok(())
  }

  pub fn back(&mut self) -> Result<(), QuizError> {
    let session = self.session_mut()?;
    match session.retreat() {
      Ok(_) => self.render(),
      Err(QuizError::Finished) => debug!(target: "quiz", "Back ignored: quiz finished"),
      Err(e) => return Err(e),
    }
    Ok(())
  }

  pub fn retry(&mut self) -> Result<(), QuizError> {
    let locale = self.locale.clone();
    self.session_mut()?.reset(&locale);
    info!(target: "quiz", %locale, "Quiz reset");
    self.render();
    Ok(())
  }

  /// React to a locale-signal notification: re-localize and repaint in place.
  pub fn locale_changed(&mut self, locale: Locale) {
    self.locale = locale;
    let Some(session) = self.session.as_mut() else {
      debug!(target: "quiz", locale = %self.locale, "Locale stored for next start");
      return;
    };
    session.on_locale_changed(&self.locale);
    self.render();
    if let Some(result) = self.session.as_ref().and_then(Session::result) {
      self.presenter.on_result(result);
    }
  }

  fn session_mut(&mut self) -> Result<&mut Session, QuizError> {
    if self.session.is_none() && self.store.is_none() {
      self.report(ErrorKind::DataUnavailable);
    }
    self.session.as_mut().ok_or(QuizError::NotStarted)
  }

  fn render(&mut self) {
    let Some(session) = self.session.as_ref() else { return };
    let rendered = RenderedQuestion::new(session.current_question(), session.current_index(), session.questions().len());
    let current = session.answer_for(rendered.id);
    let can_go_back = session.can_go_back();
    let next_label = i18n::next_label(session.locale(), session.is_last());
    self.presenter.on_question_rendered(&rendered, current);
    self.presenter.on_navigation_state_changed(can_go_back, next_label);
  }

  fn report(&mut self, kind: ErrorKind) {
    let key = match kind {
      ErrorKind::DataUnavailable => MessageKey::ErrorLoading,
      ErrorKind::AnswerRequired => MessageKey::PleaseAnswer,
    };
    let message = i18n::t(&self.locale, key);
    self.presenter.on_error(kind, message);
  }
}
