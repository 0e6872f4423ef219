//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket quiz session at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static front end from the configured directory with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/questions", get(http::http_get_questions))
        .route("/api/v1/messages", get(http::http_get_messages))
        .route("/api/v1/result", post(http::http_post_result))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::store::tests::sample_store;

    fn router(store: bool) -> Router {
        let store = store.then(sample_store);
        build_router(Arc::new(AppState::with_store(AppConfig::default(), store)))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), 1 << 20).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_store_state() {
        let (status, body) = call(router(true), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "storeLoaded": true }));
        let (_, body) = call(router(false), get("/api/v1/health")).await;
        assert_eq!(body["storeLoaded"], json!(false));
    }

    #[tokio::test]
    async fn questions_are_localized() {
        let (status, body) = call(router(true), get("/api/v1/questions?locale=en")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locale"], json!("en"));
        assert_eq!(body["questions"].as_array().unwrap().len(), 5);
        assert_eq!(body["questions"][2], json!({ "id": 2, "text": "I like being alone.", "category": "moon" }));
    }

    #[tokio::test]
    async fn missing_store_is_service_unavailable() {
        let (status, body) = call(router(false), get("/api/v1/questions?locale=en")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], json!("data_unavailable"));
        assert!(body["message"].as_str().unwrap().starts_with("Error:"));
    }

    #[tokio::test]
    async fn messages_fall_back_to_hungarian() {
        let (_, body) = call(router(true), get("/api/v1/messages?locale=de")).await;
        assert_eq!(body["locale"], json!("hu"));
        assert_eq!(body["messages"]["next"], json!("Következő"));
    }

    #[tokio::test]
    async fn result_scores_or_points_at_gap() {
        let answers = json!({ "locale": "en", "answers": { "0": 5, "1": 5, "2": 1, "3": 1, "4": 1 } });
        let (status, body) = call(router(true), post_json("/api/v1/result", answers)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sunPercent"], json!(100));
        assert_eq!(body["moonPercent"], json!(20));
        assert_eq!(body["verdict"], json!("sun"));
        assert_eq!(body["description"], json!("You are a sun type."));

        let gap = json!({ "locale": "en", "answers": { "0": 5, "2": 1 } });
        let (status, body) = call(router(true), post_json("/api/v1/result", gap)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], json!("answer_required"));
        assert_eq!(body["questionId"], json!(1));

        let bad = json!({ "answers": { "0": 9 } });
        let (status, body) = call(router(true), post_json("/api/v1/result", bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.get("kind").is_none());
    }
}
