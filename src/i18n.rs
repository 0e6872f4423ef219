//! Fixed UI strings shown around the quiz (button labels, prompts, load errors).
//!
//! Lookup falls back to Hungarian when the requested locale has no entry.

use std::collections::BTreeMap;

use crate::domain::Locale;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
  Next,
  Finish,
  PleaseAnswer,
  ErrorLoading,
}

impl MessageKey {
  pub const ALL: [MessageKey; 4] = [MessageKey::Next, MessageKey::Finish, MessageKey::PleaseAnswer, MessageKey::ErrorLoading];

  pub fn as_str(self) -> &'static str {
    match self {
      MessageKey::Next => "next",
      MessageKey::Finish => "finish",
      MessageKey::PleaseAnswer => "please_answer",
      MessageKey::ErrorLoading => "error_loading",
    }
  }
}

const FALLBACK_LOCALE: &str = "hu";

fn lookup(locale: &str, key: MessageKey) -> Option<&'static str> {
  let text = match (locale, key) {
    ("hu", MessageKey::Next) => "Következő",
    ("en", MessageKey::Next) => "Next",
    ("hu", MessageKey::Finish) => "Befejezés",
    ("en", MessageKey::Finish) => "Finish",
    ("hu", MessageKey::PleaseAnswer) => "Kérlek válaszolj erre a kérdésre mielőtt továbbmennél.",
    ("en", MessageKey::PleaseAnswer) => "Please answer this question before continuing.",
    ("hu", MessageKey::ErrorLoading) => "Hiba: a kérdéseket nem sikerült betölteni. Ellenőrizd, hogy a kérdésfájl elérhető-e a szerveren.",
    ("en", MessageKey::ErrorLoading) => "Error: the questions could not be loaded. Check that the question file is available on the server.",
    _ => return None,
  };
  Some(text)
}

/// Translate `key` for `locale`.
pub fn t(locale: &Locale, key: MessageKey) -> &'static str {
  lookup(locale.as_str(), key)
    .or_else(|| lookup(FALLBACK_LOCALE, key))
    .unwrap_or(key.as_str())
}

/// Every message for `locale`, keyed by its wire name.
pub fn messages(locale: &Locale) -> BTreeMap<&'static str, &'static str> {
  MessageKey::ALL.iter().map(|&k| (k.as_str(), t(locale, k))).collect()
}

/// Label for the forward button: "finish" on the last question.
pub fn next_label(locale: &Locale, is_last: bool) -> &'static str {
  t(locale, if is_last { MessageKey::Finish } else { MessageKey::Next })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn translates_and_falls_back_to_hungarian() {
    let en = Locale::parse("en").unwrap();
    let de = Locale::parse("de").unwrap();
    assert_eq!(t(&en, MessageKey::Next), "Next");
    assert_eq!(t(&Locale::default(), MessageKey::Finish), "Befejezés");
    assert_eq!(t(&de, MessageKey::Next), "Következő");
    assert_eq!(next_label(&en, true), "Finish");
    assert_eq!(next_label(&en, false), "Next");
  }

  #[test]
  fn message_table_has_every_key() {
    let table = messages(&Locale::parse("en").unwrap());
    assert_eq!(table.len(), MessageKey::ALL.len());
    assert_eq!(table["please_answer"], "Please answer this question before continuing.");
  }
}
