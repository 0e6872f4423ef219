//! Domain models used by the quiz: categories, questions, scores, locales and results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Stable question identifier, assigned in load order (sun list first, then moon).
pub type QuestionId = usize;

/// Which side of the sun/moon scale a question feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Sun,
  Moon,
}

/// One localized question. Built fresh on every (re)load, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
  pub id: QuestionId,
  pub text: String,
  pub category: Category,
}

/// A recorded answer on the 1..=5 agreement scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  pub fn value(self) -> u8 { self.0 }
}

impl TryFrom<i64> for Score {
  type Error = QuizError;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    if (Score::MIN as i64..=Score::MAX as i64).contains(&value) {
      Ok(Score(value as u8))
    } else {
      Err(QuizError::InvalidAnswerValue { value })
    }
  }
}

/// Recorded answers keyed by question id; survives locale changes, cleared on retry.
pub type AnswerSet = BTreeMap<QuestionId, Score>;

/// Two-letter language code, always lowercase.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
  pub const DEFAULT: &'static str = "hu";

  pub fn parse(code: &str) -> Result<Self, QuizError> {
    let code = code.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
      Ok(Locale(code.to_ascii_lowercase()))
    } else {
      Err(QuizError::InvalidLocale(code.to_string()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for Locale {
  fn default() -> Self { Locale(Self::DEFAULT.to_string()) }
}

impl fmt::Display for Locale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl<'de> Deserialize<'de> for Locale {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Locale::parse(&raw).map_err(serde::de::Error::custom)
  }
}

/// Which description the result shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Sun,
  Moon,
  Balanced,
}

/// Scored outcome of a finished quiz. Totals and percentages do not depend on the locale;
/// only `description` does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
  pub sun_total: u32,
  pub moon_total: u32,
  pub sun_max: u32,
  pub moon_max: u32,
  pub sun_percent: u8,
  pub moon_percent: u8,
  pub verdict: Verdict,
  pub description: String,
}
