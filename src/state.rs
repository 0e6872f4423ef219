//! Application state shared by every handler.
//!
//! This module owns:
//!   - the resolved configuration
//!   - the question store, loaded once at startup and shared read-only
//!
//! A store that fails to load is not fatal to the process: the service keeps running and
//! every quiz start reports the localized "could not load" error instead.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::domain::Locale;
use crate::store::QuestionStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Option<Arc<QuestionStore>>,
}

impl AppState {
    /// Build state from config: read and validate the question store.
    #[instrument(level = "info", skip_all, fields(store_path = %config.store_path.display()))]
    pub async fn load(config: AppConfig) -> Self {
        let store = match QuestionStore::load(&config.store_path, config.default_locale.clone()).await {
            Ok(store) => {
                info!(target: "sunmoon_quiz", questions = store.question_count(), default_locale = %store.default_locale(), "Question store ready");
                Some(Arc::new(store))
            }
            Err(e) => {
                error!(target: "sunmoon_quiz", error = %e, "Question store unavailable; quiz will report a loading error");
                None
            }
        };
        Self { config, store }
    }

    pub fn with_store(config: AppConfig, store: Option<QuestionStore>) -> Self {
        Self { config, store: store.map(Arc::new) }
    }

    /// The locale to use for a request: the requested one if the store carries it,
    /// otherwise the configured default.
    pub fn locale_for(&self, requested: Option<&Locale>) -> Locale {
        let requested = requested.cloned().unwrap_or_else(|| self.config.default_locale.clone());
        match &self.store {
            Some(store) => store.resolve_locale(&requested),
            None => requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_store;

    #[tokio::test]
    async fn missing_store_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig { store_path: dir.path().join("none.json"), ..AppConfig::default() };
        let state = AppState::load(config).await;
        assert!(state.store.is_none());
        let en = Locale::parse("en").unwrap();
        assert_eq!(state.locale_for(Some(&en)), en);
    }

    #[test]
    fn locale_resolution_uses_store_and_default() {
        let state = AppState::with_store(AppConfig::default(), Some(sample_store()));
        assert_eq!(state.locale_for(None), Locale::default());
        let de = Locale::parse("de").unwrap();
        assert_eq!(state.locale_for(Some(&de)), Locale::default());
    }
}
