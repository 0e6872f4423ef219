//! Question store: the bilingual JSON asset with the sun/moon question lists and the
//! three result descriptions.
//!
//! Two shapes are accepted:
//!   - localized: `"sun": { "hu": [...], "en": [...] }`, `"descriptions": { "sun": { "hu": "..." } }`
//!   - legacy flat: `"sun": [...]`, `"descriptions": { "sun": "..." }`
//!
//! Both are normalized into one bundle per locale at load time. A flat value applies to
//! every locale. Lookups for a locale the store does not carry fall back to the default.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::domain::{Category, Locale, Question, Verdict};
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Localized<T> {
  PerLocale(BTreeMap<Locale, T>),
  Flat(T),
}

impl<T> Localized<T> {
  fn get(&self, locale: &Locale) -> Option<&T> {
    match self {
      Localized::PerLocale(map) => map.get(locale),
      Localized::Flat(value) => Some(value),
    }
  }

  fn locales(&self) -> impl Iterator<Item = &Locale> {
    let keys = match self {
      Localized::PerLocale(map) => Some(map.keys()),
      Localized::Flat(_) => None,
    };
    keys.into_iter().flatten()
  }
}

#[derive(Debug, Deserialize)]
struct RawStore {
  sun: Localized<Vec<String>>,
  moon: Localized<Vec<String>>,
  descriptions: RawDescriptions,
}

#[derive(Debug, Deserialize)]
struct RawDescriptions {
  sun: Localized<String>,
  moon: Localized<String>,
  balanced: Localized<String>,
}

/// Result descriptions for one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptions {
  pub sun: String,
  pub moon: String,
  pub balanced: String,
}

impl Descriptions {
  pub fn for_verdict(&self, verdict: Verdict) -> &str {
    match verdict {
      Verdict::Sun => &self.sun,
      Verdict::Moon => &self.moon,
      Verdict::Balanced => &self.balanced,
    }
  }
}

/// Everything the quiz needs for one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleBundle {
  pub sun: Vec<String>,
  pub moon: Vec<String>,
  pub descriptions: Descriptions,
}

/// Normalized, validated question store. Question counts per category are identical in
/// every locale, so question ids stay stable across a locale switch.
#[derive(Clone, Debug)]
pub struct QuestionStore {
  default_locale: Locale,
  default_bundle: LocaleBundle,
  bundles: BTreeMap<Locale, LocaleBundle>,
}

impl QuestionStore {
  /// Read and validate the store from disk.
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), %default_locale))]
  pub async fn load(path: impl AsRef<Path>, default_locale: Locale) -> Result<Self, StoreError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| StoreError::Io {
      path: path.display().to_string(),
      source,
    })?;
    let store = Self::from_json(&raw, default_locale)?;
    info!(
      target: "quiz",
      locales = ?store.locales().map(Locale::as_str).collect::<Vec<_>>(),
      sun = store.sun_count(),
      moon = store.moon_count(),
      "Question store loaded"
    );
    Ok(store)
  }

  /// Parse and validate a store document.
  pub fn from_json(json: &str, default_locale: Locale) -> Result<Self, StoreError> {
    let raw: RawStore = serde_json::from_str(json)?;
    Self::normalize(raw, default_locale)
  }

  fn normalize(raw: RawStore, default_locale: Locale) -> Result<Self, StoreError> {
    let mut locales: BTreeSet<Locale> = BTreeSet::new();
    locales.extend(raw.sun.locales().cloned());
    locales.extend(raw.moon.locales().cloned());
    locales.extend(raw.descriptions.sun.locales().cloned());
    locales.extend(raw.descriptions.moon.locales().cloned());
    locales.extend(raw.descriptions.balanced.locales().cloned());
    locales.insert(default_locale.clone());

    let mut bundles = BTreeMap::new();
    for locale in locales {
      let missing = |field: &str| StoreError::Invalid(format!("'{field}' has no entry for locale '{locale}'"));
      let bundle = LocaleBundle {
        sun: raw.sun.get(&locale).ok_or_else(|| missing("sun"))?.clone(),
        moon: raw.moon.get(&locale).ok_or_else(|| missing("moon"))?.clone(),
        descriptions: Descriptions {
          sun: raw.descriptions.sun.get(&locale).ok_or_else(|| missing("descriptions.sun"))?.clone(),
          moon: raw.descriptions.moon.get(&locale).ok_or_else(|| missing("descriptions.moon"))?.clone(),
          balanced: raw.descriptions.balanced.get(&locale).ok_or_else(|| missing("descriptions.balanced"))?.clone(),
        },
      };
      bundles.insert(locale, bundle);
    }

    let default_bundle = bundles
      .remove(&default_locale)
      .ok_or_else(|| StoreError::Invalid(format!("default locale '{default_locale}' missing")))?;

    if default_bundle.sun.len() + default_bundle.moon.len() == 0 {
      return Err(StoreError::Invalid("store contains no questions".into()));
    }
    for (locale, bundle) in &bundles {
      if bundle.sun.len() != default_bundle.sun.len() || bundle.moon.len() != default_bundle.moon.len() {
        return Err(StoreError::Invalid(format!(
          "locale '{locale}' has {}/{} sun/moon questions, default '{default_locale}' has {}/{}",
          bundle.sun.len(),
          bundle.moon.len(),
          default_bundle.sun.len(),
          default_bundle.moon.len()
        )));
      }
    }

    Ok(Self { default_locale, default_bundle, bundles })
  }

  pub fn default_locale(&self) -> &Locale { &self.default_locale }

  /// All locales the store carries, default first.
  pub fn locales(&self) -> impl Iterator<Item = &Locale> {
    std::iter::once(&self.default_locale).chain(self.bundles.keys())
  }

  pub fn supports(&self, locale: &Locale) -> bool {
    *locale == self.default_locale || self.bundles.contains_key(locale)
  }

  /// The locale actually used for `requested`: itself if carried, else the default.
  pub fn resolve_locale(&self, requested: &Locale) -> Locale {
    if self.supports(requested) { requested.clone() } else { self.default_locale.clone() }
  }

  fn bundle(&self, locale: &Locale) -> &LocaleBundle {
    self.bundles.get(locale).unwrap_or(&self.default_bundle)
  }

  pub fn sun_count(&self) -> usize { self.default_bundle.sun.len() }

  pub fn moon_count(&self) -> usize { self.default_bundle.moon.len() }

  pub fn question_count(&self) -> usize { self.sun_count() + self.moon_count() }

  /// Sun questions then moon questions, ids sequential from 0 in that order.
  pub fn questions(&self, locale: &Locale) -> Vec<Question> {
    let bundle = self.bundle(locale);
    let sun = bundle.sun.iter().map(|t| (Category::Sun, t));
    let moon = bundle.moon.iter().map(|t| (Category::Moon, t));
    sun.chain(moon)
      .enumerate()
      .map(|(id, (category, text))| Question { id, text: text.clone(), category })
      .collect()
  }

  pub fn description(&self, verdict: Verdict, locale: &Locale) -> &str {
    self.bundle(locale).descriptions.for_verdict(verdict)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::io::Write;

  pub(crate) const LOCALIZED: &str = r#"{
    "sun": { "hu": ["Szeretek társaságban lenni.", "Gyorsan döntök."], "en": ["I enjoy company.", "I decide quickly."] },
    "moon": { "hu": ["Szeretek egyedül lenni.", "Sokat gondolkodom.", "Éjjel vagyok a legaktívabb."],
              "en": ["I like being alone.", "I think a lot.", "I am most active at night."] },
    "descriptions": {
      "sun": { "hu": "Nap típus vagy.", "en": "You are a sun type." },
      "moon": { "hu": "Hold típus vagy.", "en": "You are a moon type." },
      "balanced": { "hu": "Kiegyensúlyozott vagy.", "en": "You are balanced." }
    }
  }"#;

  pub(crate) fn sample_store() -> QuestionStore {
    QuestionStore::from_json(LOCALIZED, Locale::default()).expect("sample store")
  }

  fn en() -> Locale { Locale::parse("en").unwrap() }

  #[test]
  fn builds_sun_then_moon_with_sequential_ids() {
    let store = sample_store();
    for locale in [Locale::default(), en()] {
      let qs = store.questions(&locale);
      assert_eq!(qs.len(), 5);
      assert_eq!(qs.iter().map(|q| q.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
      assert!(qs[..2].iter().all(|q| q.category == Category::Sun));
      assert!(qs[2..].iter().all(|q| q.category == Category::Moon));
    }
    assert_eq!(store.questions(&en())[2].text, "I like being alone.");
  }

  #[test]
  fn unknown_locale_falls_back_to_default() {
    let store = sample_store();
    let de = Locale::parse("de").unwrap();
    assert!(!store.supports(&de));
    assert_eq!(store.resolve_locale(&de).as_str(), "hu");
    assert_eq!(store.questions(&de)[0].text, "Szeretek társaságban lenni.");
    assert_eq!(store.description(Verdict::Balanced, &de), "Kiegyensúlyozott vagy.");
  }

  #[test]
  fn legacy_flat_shape_applies_to_every_locale() {
    let flat = r#"{
      "sun": ["a", "b"],
      "moon": ["c"],
      "descriptions": { "sun": "S", "moon": "M", "balanced": "B" }
    }"#;
    let store = QuestionStore::from_json(flat, Locale::default()).unwrap();
    assert_eq!(store.question_count(), 3);
    assert_eq!(store.questions(&en())[2].text, "c");
    assert_eq!(store.description(Verdict::Moon, &en()), "M");
  }

  #[test]
  fn mixed_shapes_are_normalized() {
    let mixed = r#"{
      "sun": { "hu": ["a"], "en": ["A"] },
      "moon": ["c"],
      "descriptions": { "sun": "S", "moon": { "hu": "m", "en": "M" }, "balanced": "B" }
    }"#;
    let store = QuestionStore::from_json(mixed, Locale::default()).unwrap();
    assert_eq!(store.locales().count(), 2);
    assert_eq!(store.questions(&en())[0].text, "A");
    assert_eq!(store.description(Verdict::Moon, &en()), "M");
    assert_eq!(store.description(Verdict::Sun, &en()), "S");
  }

  #[test]
  fn rejects_locale_missing_from_a_field() {
    let broken = r#"{
      "sun": { "hu": ["a"], "en": ["A"] },
      "moon": { "hu": ["b"] },
      "descriptions": { "sun": "S", "moon": "M", "balanced": "B" }
    }"#;
    let err = QuestionStore::from_json(broken, Locale::default()).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(ref m) if m.contains("moon") && m.contains("en")), "{err}");
  }

  #[test]
  fn rejects_mismatched_question_counts() {
    let broken = r#"{
      "sun": { "hu": ["a", "b"], "en": ["A"] },
      "moon": { "hu": ["c"], "en": ["C"] },
      "descriptions": { "sun": "S", "moon": "M", "balanced": "B" }
    }"#;
    assert!(matches!(QuestionStore::from_json(broken, Locale::default()), Err(StoreError::Invalid(_))));
  }

  #[test]
  fn rejects_missing_default_and_empty_store() {
    let en_only = r#"{
      "sun": { "en": ["A"] }, "moon": { "en": ["C"] },
      "descriptions": { "sun": "S", "moon": "M", "balanced": "B" }
    }"#;
    assert!(QuestionStore::from_json(en_only, Locale::default()).is_err());
    assert!(QuestionStore::from_json(en_only, en()).is_ok());

    let empty = r#"{ "sun": [], "moon": [], "descriptions": { "sun": "S", "moon": "M", "balanced": "B" } }"#;
    assert!(matches!(QuestionStore::from_json(empty, Locale::default()), Err(StoreError::Invalid(_))));
  }

  #[test]
  fn rejects_broken_json() {
    assert!(matches!(QuestionStore::from_json("{ not json", Locale::default()), Err(StoreError::Json(_))));
  }

  #[tokio::test]
  async fn loads_from_disk_and_reports_missing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LOCALIZED.as_bytes()).unwrap();
    let store = QuestionStore::load(file.path(), Locale::default()).await.unwrap();
    assert_eq!(store.sun_count(), 2);
    assert_eq!(store.moon_count(), 3);

    let dir = tempfile::tempdir().unwrap();
    let err = QuestionStore::load(dir.path().join("missing.json"), Locale::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
  }
}
