//! WebSocket upgrade + quiz session loop. Each connection owns one controller; client
//! messages and locale-signal notifications are handled one at a time, and everything the
//! controller paints is flushed back as JSON messages.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug, warn};
use uuid::Uuid;

use crate::domain::{QuizResult, Score};
use crate::error::ErrorKind;
use crate::locale::{LocaleSignal, LocaleSubscription};
use crate::presenter::{QuizController, QuizPresenter, RenderedQuestion};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

/// Presenter that queues protocol messages until the loop flushes them.
#[derive(Debug, Default)]
pub struct Outbox(Vec<ServerWsMessage>);

impl Outbox {
  pub fn push(&mut self, msg: ServerWsMessage) { self.0.push(msg); }
  pub fn drain(&mut self) -> Vec<ServerWsMessage> { std::mem::take(&mut self.0) }
}

impl QuizPresenter for Outbox {
  fn on_question_rendered(&mut self, question: &RenderedQuestion, current_answer: Option<Score>) {
    self.push(ServerWsMessage::Question { question: question.clone(), current_answer: current_answer.map(Score::value) });
  }

  fn on_navigation_state_changed(&mut self, can_go_back: bool, next_label: &str) {
    self.push(ServerWsMessage::Navigation { can_go_back, next_label: next_label.to_string() });
  }

  fn on_result(&mut self, result: &QuizResult) {
    self.push(ServerWsMessage::Result { result: result.clone() });
  }

  fn on_error(&mut self, kind: ErrorKind, message: &str) {
    self.push(ServerWsMessage::Error { kind: Some(kind), message: message.to_string() });
  }
}

/// One connection's quiz: the controller plus the locale signal it listens to.
pub struct QuizConnection {
  controller: QuizController<Outbox>,
  signal: LocaleSignal,
}

impl QuizConnection {
  pub fn new(state: &AppState) -> (Self, LocaleSubscription) {
    let locale = state.config.default_locale.clone();
    let signal = LocaleSignal::new(locale.clone());
    let subscription = signal.subscribe();
    let controller = QuizController::new(state.store.clone(), locale, Outbox::default());
    (Self { controller, signal }, subscription)
  }

  /// Apply one client message; returns the messages to send back.
  pub fn handle(&mut self, msg: ClientWsMessage) -> Vec<ServerWsMessage> {
    let outcome = match msg {
      ClientWsMessage::Ping => {
        self.controller.presenter_mut().push(ServerWsMessage::Pong);
        Ok(())
      }
      ClientWsMessage::Start { locale } => {
        if let Some(locale) = locale {
          self.signal.publish(locale.clone());
          self.controller.locale_changed(locale);
        }
        self.controller.start();
        Ok(())
      }
      ClientWsMessage::Answer { question_id, value } => self.controller.answer(question_id, value),
      ClientWsMessage::Next { trigger } => self.controller.next(trigger),
      ClientWsMessage::Back => self.controller.back(),
      ClientWsMessage::Retry => self.controller.retry(),
      ClientWsMessage::SetLocale { locale } => {
        // The subscription delivers the change back through `locale_notified`.
        if !self.signal.publish(locale) {
          debug!(target: "sunmoon_quiz", current = %self.signal.current(), "Locale unchanged");
        }
        Ok(())
      }
    };
    if let Err(e) = outcome {
      warn!(target: "sunmoon_quiz", error = %e, "Client event rejected");
      self.controller.presenter_mut().push(ServerWsMessage::Error { kind: e.kind(), message: e.to_string() });
    }
    self.controller.presenter_mut().drain()
  }

  /// How many questions this connection has answered so far.
  pub fn answered(&self) -> usize {
    self.controller.session().map_or(0, |s| s.answers().len())
  }

  /// Apply a locale published on the signal.
  pub fn locale_notified(&mut self, subscription: &mut LocaleSubscription) -> Vec<ServerWsMessage> {
    let locale = subscription.borrow_and_update().clone();
    if &locale != self.controller.locale() {
      self.controller.locale_changed(locale);
    }
    self.controller.presenter_mut().drain()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "sunmoon_quiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(conn = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "sunmoon_quiz", "WebSocket connected");
  let (mut conn, mut locale_rx) = QuizConnection::new(&state);

  loop {
    let replies = tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(incoming) => {
              debug!(target: "sunmoon_quiz", "WS received: {:?}", &incoming);
              conn.handle(incoming)
            }
            Err(e) => vec![ServerWsMessage::Error { kind: None, message: format!("Invalid JSON: {}", e) }],
          },
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; continue; }
          Message::Close(_) => break,
          _ => continue,
        }
      }
      changed = locale_rx.changed() => {
        if changed.is_err() { break; }
        conn.locale_notified(&mut locale_rx)
      }
    };

    for reply in replies {
      let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
      });
      if let Err(e) = socket.send(Message::Text(out)).await {
        error!(target: "sunmoon_quiz", error = %e, "WS send error");
        return;
      }
    }
  }
  info!(target: "sunmoon_quiz", answered = conn.answered(), "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::domain::Locale;
  use crate::presenter::NextTrigger;
  use crate::store::tests::sample_store;

  fn msg(json: &str) -> ClientWsMessage { serde_json::from_str(json).unwrap() }

  fn connection(store: bool) -> (QuizConnection, LocaleSubscription) {
    QuizConnection::new(&AppState::with_store(AppConfig::default(), store.then(sample_store)))
  }

  #[test]
  fn start_sends_question_and_navigation() {
    let (mut conn, _rx) = connection(true);
    let out = conn.handle(msg(r#"{"type":"start","locale":"en"}"#));
    assert_eq!(out.len(), 2);
    assert!(matches!(&out[0], ServerWsMessage::Question { question, current_answer: None } if question.title == "1. I enjoy company."));
    assert!(matches!(&out[1], ServerWsMessage::Navigation { can_go_back: false, next_label } if next_label == "Next"));
  }

  #[test]
  fn start_without_store_sends_loading_error() {
    let (mut conn, _rx) = connection(false);
    let out = conn.handle(msg(r#"{"type":"start"}"#));
    assert!(matches!(&out[..], [ServerWsMessage::Error { kind: Some(ErrorKind::DataUnavailable), .. }]));
  }

  #[test]
  fn enter_and_button_share_validation() {
    let (mut conn, _rx) = connection(true);
    conn.handle(msg(r#"{"type":"start"}"#));
    for trigger in [NextTrigger::Button, NextTrigger::EnterKey] {
      let out = conn.handle(ClientWsMessage::Next { trigger });
      assert!(matches!(&out[..], [ServerWsMessage::Error { kind: Some(ErrorKind::AnswerRequired), .. }]));
    }
    let out = conn.handle(msg(r#"{"type":"answer","questionId":0,"value":9}"#));
    assert!(matches!(&out[..], [ServerWsMessage::Error { kind: None, .. }]));
    assert!(conn.handle(msg(r#"{"type":"answer","questionId":0,"value":4}"#)).is_empty());
    let out = conn.handle(msg(r#"{"type":"next","trigger":"enter_key"}"#));
    assert!(matches!(&out[0], ServerWsMessage::Question { question, .. } if question.number == 2));
  }

  #[tokio::test]
  async fn set_locale_flows_through_the_signal() {
    let (mut conn, mut rx) = connection(true);
    conn.handle(msg(r#"{"type":"start"}"#));
    conn.handle(msg(r#"{"type":"answer","questionId":0,"value":2}"#));
    assert!(conn.handle(msg(r#"{"type":"set_locale","locale":"en"}"#)).is_empty());

    rx.changed().await.unwrap();
    let out = conn.locale_notified(&mut rx);
    assert!(matches!(&out[0], ServerWsMessage::Question { question, current_answer: Some(2) } if question.text == "I enjoy company."));
    assert!(matches!(&out[1], ServerWsMessage::Navigation { next_label, .. } if next_label == "Next"));

    assert!(conn.handle(msg(r#"{"type":"set_locale","locale":"en"}"#)).is_empty());
    assert!(!rx.has_changed().unwrap());
    assert_eq!(conn.controller.locale(), &Locale::parse("en").unwrap());
  }

  #[test]
  fn ping_pongs() {
    let (mut conn, _rx) = connection(true);
    assert!(matches!(&conn.handle(ClientWsMessage::Ping)[..], [ServerWsMessage::Pong]));
  }
}
