//! Service configuration: optional TOML file plus environment overrides.
//!
//! TOML schema (all keys optional):
//!
//! ```toml
//! [quiz]
//! store_path = "data/personality-test-questions.json"
//! default_locale = "hu"
//!
//! [server]
//! static_dir = "./static"
//! port = 3000
//! ```
//!
//! Precedence: environment > TOML > built-in defaults.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Locale;

pub const DEFAULT_STORE_PATH: &str = "data/personality-test-questions.json";
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)]
  pub quiz: QuizSection,
  #[serde(default)]
  pub server: ServerSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizSection {
  #[serde(default)] pub store_path: Option<PathBuf>,
  #[serde(default)] pub default_locale: Option<Locale>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServerSection {
  #[serde(default)] pub static_dir: Option<PathBuf>,
  #[serde(default)] pub port: Option<u16>,
}

/// Fully resolved settings the service runs with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
  pub store_path: PathBuf,
  pub default_locale: Locale,
  pub static_dir: PathBuf,
  pub port: u16,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from(DEFAULT_STORE_PATH),
      default_locale: Locale::default(),
      static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
      port: DEFAULT_PORT,
    }
  }
}

impl AppConfig {
  /// Resolve from QUIZ_CONFIG_PATH (if set) and the process environment.
  pub fn from_env() -> Self {
    let file = load_file_config_from_env().unwrap_or_default();
    Self::resolve(file, |key| std::env::var(key).ok())
  }

  /// Merge file settings with environment lookups. Invalid env values are logged and ignored.
  pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
    let mut cfg = AppConfig::default();

    if let Some(p) = file.quiz.store_path { cfg.store_path = p; }
    if let Some(l) = file.quiz.default_locale { cfg.default_locale = l; }
    if let Some(d) = file.server.static_dir { cfg.static_dir = d; }
    if let Some(p) = file.server.port { cfg.port = p; }

    if let Some(p) = env("QUESTION_STORE_PATH") { cfg.store_path = PathBuf::from(p); }
    if let Some(d) = env("STATIC_DIR") { cfg.static_dir = PathBuf::from(d); }
    if let Some(raw) = env("DEFAULT_LOCALE") {
      match Locale::parse(&raw) {
        Ok(l) => cfg.default_locale = l,
        Err(e) => warn!(target: "sunmoon_quiz", %raw, error = %e, "Ignoring DEFAULT_LOCALE"),
      }
    }
    if let Some(raw) = env("PORT") {
      match raw.parse::<u16>() {
        Ok(p) => cfg.port = p,
        Err(e) => warn!(target: "sunmoon_quiz", %raw, error = %e, "Ignoring PORT"),
      }
    }
    cfg
  }
}

/// Attempt to load `FileConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_file_config_from_env() -> Option<FileConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<FileConfig>(&s) {
      Ok(cfg) => {
        info!(target: "sunmoon_quiz", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sunmoon_quiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sunmoon_quiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn defaults_without_file_or_env() {
    assert_eq!(AppConfig::resolve(FileConfig::default(), env_of(&[])), AppConfig::default());
  }

  #[test]
  fn toml_then_env_precedence() {
    let file: FileConfig = toml::from_str(
      r#"
      [quiz]
      store_path = "from-file.json"
      default_locale = "en"

      [server]
      static_dir = "web"
      port = 8080
      "#,
    )
    .unwrap();
    let cfg = AppConfig::resolve(file, env_of(&[("QUESTION_STORE_PATH", "from-env.json"), ("PORT", "9000")]));
    assert_eq!(cfg.store_path, PathBuf::from("from-env.json"));
    assert_eq!(cfg.default_locale.as_str(), "en");
    assert_eq!(cfg.static_dir, PathBuf::from("web"));
    assert_eq!(cfg.port, 9000);
  }

  #[test]
  fn invalid_env_values_are_ignored() {
    let cfg = AppConfig::resolve(FileConfig::default(), env_of(&[("DEFAULT_LOCALE", "english"), ("PORT", "nope")]));
    assert_eq!(cfg.default_locale, Locale::default());
    assert_eq!(cfg.port, DEFAULT_PORT);
  }

  #[test]
  fn rejects_bad_locale_in_toml() {
    assert!(toml::from_str::<FileConfig>("[quiz]\ndefault_locale = \"xyz\"").is_err());
  }
}
