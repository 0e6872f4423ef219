//! Quiz session: the question sequence, recorded answers and the answering/finished state
//! machine.
//!
//! States are `Answering` (at `current_index`) and `Finished(result)`. `advance` on the last
//! answered question is the only way into `Finished`; `reset` is the only way out.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::{AnswerSet, Locale, Question, QuestionId, QuizResult, Score};
use crate::error::QuizError;
use crate::scoring;
use crate::store::QuestionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
  Answering,
  Finished(QuizResult),
}

/// What a successful `advance` did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
  Moved { index: usize },
  Finished(QuizResult),
}

#[derive(Clone, Debug)]
pub struct Session {
  store: Arc<QuestionStore>,
  locale: Locale,
  questions: Vec<Question>,
  answers: AnswerSet,
  current_index: usize,
  phase: Phase,
}

impl Session {
  /// Build a fresh session at the first question. An unsupported locale resolves to the
  /// store's default.
  #[instrument(level = "debug", skip_all, fields(%locale))]
  pub fn load(store: Arc<QuestionStore>, locale: &Locale) -> Self {
    let locale = store.resolve_locale(locale);
    let questions = store.questions(&locale);
    debug!(target: "quiz", %locale, questions = questions.len(), "Session loaded");
    Self { store, locale, questions, answers: AnswerSet::new(), current_index: 0, phase: Phase::Answering }
  }

  pub fn locale(&self) -> &Locale { &self.locale }
  pub fn questions(&self) -> &[Question] { &self.questions }
  pub fn answers(&self) -> &AnswerSet { &self.answers }
  pub fn current_index(&self) -> usize { self.current_index }

  pub fn current_question(&self) -> &Question { &self.questions[self.current_index] }

  pub fn answer_for(&self, id: QuestionId) -> Option<Score> { self.answers.get(&id).copied() }

  pub fn is_last(&self) -> bool { self.current_index + 1 == self.questions.len() }

  pub fn can_go_back(&self) -> bool { self.current_index > 0 }

  pub fn is_finished(&self) -> bool { matches!(self.phase, Phase::Finished(_)) }

  pub fn result(&self) -> Option<&QuizResult> {
    match &self.phase {
      Phase::Finished(r) => Some(r),
      Phase::Answering => None,
    }
  }

  /// Upsert the answer for `id`. Out-of-range values are rejected, never clamped.
  pub fn record_answer(&mut self, id: QuestionId, value: i64) -> Result<Score, QuizError> {
    if self.is_finished() {
      return Err(QuizError::Finished);
    }
    if id >= self.questions.len() {
      return Err(QuizError::UnknownQuestion(id));
    }
    let score = Score::try_from(value)?;
    self.answers.insert(id, score);
    debug!(target: "quiz", question_id = id, value = score.value(), "Answer recorded");
    Ok(score)
  }

  /// Move to the next question, or score the quiz when leaving the last one.
  /// The current question must be answered; this is checked on every call.
  pub fn advance(&mut self) -> Result<Advance, QuizError> {
    if self.is_finished() {
      return Err(QuizError::Finished);
    }
    let question_id = self.current_question().id;
    if !self.answers.contains_key(&question_id) {
      return Err(QuizError::AnswerRequired { question_id });
    }
    if !self.is_last() {
      self.current_index += 1;
      return Ok(Advance::Moved { index: self.current_index });
    }

    let result = scoring::score(&self.questions, &self.answers, &self.store, &self.locale);
    info!(
      target: "quiz",
      sun_percent = result.sun_percent,
      moon_percent = result.moon_percent,
      verdict = ?result.verdict,
      "Quiz finished"
    );
    self.phase = Phase::Finished(result.clone());
    Ok(Advance::Finished(result))
  }

  /// Step back one question. A no-op on the first question.
  pub fn retreat(&mut self) -> Result<usize, QuizError> {
    if self.is_finished() {
      return Err(QuizError::Finished);
    }
    if self.current_index > 0 {
      self.current_index -= 1;
    }
    Ok(self.current_index)
  }

  /// Drop every answer and start over at the first question in `locale`.
  #[instrument(level = "debug", skip_all, fields(%locale))]
  pub fn reset(&mut self, locale: &Locale) {
    self.locale = self.store.resolve_locale(locale);
    self.questions = self.store.questions(&self.locale);
    self.answers.clear();
    self.current_index = 0;
    self.phase = Phase::Answering;
  }

  /// Re-localize question text (and a finished result's description) without touching
  /// answers, position or scores.
  #[instrument(level = "debug", skip_all, fields(%locale))]
  pub fn on_locale_changed(&mut self, locale: &Locale) {
    let locale = self.store.resolve_locale(locale);
    self.questions = self.store.questions(&locale);
    if let Phase::Finished(result) = &mut self.phase {
      scoring::relocalize(result, &self.store, &locale);
    }
    self.locale = locale;
  }
}
