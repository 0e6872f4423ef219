//! Sun/Moon personality quiz backend
//!
//! - Quiz engine: question sequencing, answer capture, sun/moon scoring, result selection
//! - Axum HTTP + WebSocket API driving one quiz session per connection
//! - Static front end fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   QUIZ_CONFIG_PATH    : optional TOML config (see `config`)
//!   QUESTION_STORE_PATH : question store JSON (default "data/personality-test-questions.json")
//!   DEFAULT_LOCALE      : two-letter code (default "hu")
//!   STATIC_DIR          : front end directory (default "./static")
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod error;
mod domain;
mod config;
mod store;
mod scoring;
mod session;
mod i18n;
mod locale;
mod presenter;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  // Load the question store once; a failure is reported per session, not fatal here.
  let state = Arc::new(AppState::load(config).await);

  let app = build_router(state.clone());

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sunmoon_quiz", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "sunmoon_quiz", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "sunmoon_quiz", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "sunmoon_quiz", "Shutdown requested");
}
