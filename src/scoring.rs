//! Sun/moon score aggregation and result selection.

use crate::domain::{AnswerSet, Category, Locale, Question, QuizResult, Score, Verdict};
use crate::store::QuestionStore;

/// Percentages closer than this pick the balanced description.
pub const BALANCED_MARGIN: u8 = 2;

/// Raw per-category sums. Unanswered questions count as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
  pub sun_total: u32,
  pub moon_total: u32,
  pub sun_max: u32,
  pub moon_max: u32,
}

pub fn tally(questions: &[Question], answers: &AnswerSet) -> Tally {
  let mut t = Tally::default();
  for q in questions {
    let value = answers.get(&q.id).map(|s| s.value() as u32).unwrap_or(0);
    match q.category {
      Category::Sun => {
        t.sun_total += value;
        t.sun_max += Score::MAX as u32;
      }
      Category::Moon => {
        t.moon_total += value;
        t.moon_max += Score::MAX as u32;
      }
    }
  }
  t
}

/// `round(total / max * 100)`, halves rounding up. An empty category scores 0.
pub fn percent(total: u32, max: u32) -> u8 {
  if max == 0 {
    return 0;
  }
  let rounded = (total as u64 * 200 + max as u64) / (2 * max as u64);
  rounded.min(100) as u8
}

pub fn verdict(sun_percent: u8, moon_percent: u8) -> Verdict {
  if sun_percent.abs_diff(moon_percent) <= BALANCED_MARGIN {
    Verdict::Balanced
  } else if sun_percent > moon_percent {
    Verdict::Sun
  } else {
    Verdict::Moon
  }
}

/// Score the answers and attach the description for `locale`.
pub fn score(questions: &[Question], answers: &AnswerSet, store: &QuestionStore, locale: &Locale) -> QuizResult {
  let t = tally(questions, answers);
  let sun_percent = percent(t.sun_total, t.sun_max);
  let moon_percent = percent(t.moon_total, t.moon_max);
  let verdict = verdict(sun_percent, moon_percent);
  QuizResult {
    sun_total: t.sun_total,
    moon_total: t.moon_total,
    sun_max: t.sun_max,
    moon_max: t.moon_max,
    sun_percent,
    moon_percent,
    verdict,
    description: store.description(verdict, locale).to_string(),
  }
}

/// Swap only the description text; the numbers stay as scored.
pub fn relocalize(result: &mut QuizResult, store: &QuestionStore, locale: &Locale) {
  result.description = store.description(result.verdict, locale).to_string();
}
