//! Locale signal: publish/subscribe channel for the active language.
//!
//! The transport publishes whenever the user switches language; the quiz controller's
//! owner awaits the subscription and feeds new codes into `QuizController::locale_changed`.
//! Publishing the locale that is already active does not notify subscribers.

use tokio::sync::watch;
use tracing::debug;

use crate::domain::Locale;

pub type LocaleSubscription = watch::Receiver<Locale>;

#[derive(Debug)]
pub struct LocaleSignal {
  tx: watch::Sender<Locale>,
}

impl LocaleSignal {
  pub fn new(initial: Locale) -> Self {
    let (tx, _rx) = watch::channel(initial);
    Self { tx }
  }

  pub fn current(&self) -> Locale { self.tx.borrow().clone() }

  pub fn subscribe(&self) -> LocaleSubscription { self.tx.subscribe() }

  /// Set the active locale. Returns true if it changed.
  pub fn publish(&self, locale: Locale) -> bool {
    let changed = self.tx.send_if_modified(|current| {
      if *current == locale {
        false
      } else {
        *current = locale.clone();
        true
      }
    });
    debug!(target: "sunmoon_quiz", %locale, changed, "Locale published");
    changed
  }
}

impl Default for LocaleSignal {
  fn default() -> Self { Self::new(Locale::default()) }
}
