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
/// - WebSocket at `/ws`
/// - catalog + session API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/health", get(http::http_health))
        // Catalog
        .route("/api/v1/topics", get(http::http_get_topics))
        .route("/api/v1/chapters", get(http::http_get_chapters))
        .route("/api/v1/problems", get(http::http_get_problems))
        .route("/api/v1/problems/sample", get(http::http_get_sample_problem))
        .route("/api/v1/problems/:id", get(http::http_get_problem))
        // Tutoring sessions
        .route("/api/v1/sessions", post(http::http_post_session))
        .route(
            "/api/v1/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/api/v1/sessions/:id/chat", post(http::http_post_chat))
        .route("/api/v1/sessions/:id/hint", post(http::http_post_hint))
        .route("/api/v1/sessions/:id/solution", post(http::http_post_solution))
        .route("/api/v1/sessions/:id/reset", post(http::http_post_reset))
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
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::catalog::ProblemCatalog;
    use crate::config::Policies;
    use crate::generation::testing::FakeGenerator;
    use crate::seeds::seed_problems;
    use crate::tutor::TutorEngine;

    fn app(with_engine: bool) -> Router {
        let engine = with_engine.then(|| {
            TutorEngine::new(Arc::new(FakeGenerator::replying("What do you need to find?")), Policies::default())
        });
        build_router(Arc::new(AppState::new(ProblemCatalog::from_problems(seed_problems()), engine)))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_engine_and_catalog() {
        let (status, body) = call(&app(false), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_tutor"], false);
        assert_eq!(body["problem_count"], 3);
    }

    #[tokio::test]
    async fn catalog_endpoints_work_without_engine() {
        let app = app(false);
        let (_, body) = call(&app, "GET", "/api/v1/topics", None).await;
        assert_eq!(body["topics"].as_array().unwrap().len(), 3);
        let (status, body) = call(&app, "GET", "/api/v1/problems?difficulty=easy", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        let (status, _) = call(&app, "GET", "/api/v1/problems/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = call(&app, "GET", "/api/v1/problems/sample?topic=Rotation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "seed-rot-1");
    }

    #[tokio::test]
    async fn sessions_need_a_backend() {
        let body = serde_json::json!({ "problem_id": "seed-pm-1" });
        let (status, _) = call(&app(false), "POST", "/api/v1/sessions", Some(body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn full_session_flow() {
        let app = app(true);
        let start = serde_json::json!({ "text": "Find the range of a ball thrown at 20 m/s from 45 m.", "type": "numerical" });
        let (status, body) = call(&app, "POST", "/api/v1/sessions", Some(start)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["initial_message"], "What do you need to find?");
        assert_eq!(body["problem"]["user_submitted"], true);
        let id = body["session_id"].as_str().unwrap().to_string();

        let chat = serde_json::json!({ "message": "The range" });
        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/chat"), Some(chat)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "What do you need to find?");

        for level in 1..=3 {
            let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/hint"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["level"], level);
        }
        let (status, _) = call(&app, "POST", &format!("/api/v1/sessions/{id}/hint"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/solution"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "ai_generated");

        let (_, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["hint_level"], 3);
        assert_eq!(body["solution_revealed"], true);

        let (status, _) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_session_returns_official_solution() {
        let app = app(true);
        let (_, body) = call(&app, "POST", "/api/v1/sessions", Some(serde_json::json!({ "problem_id": "seed-pm-1" }))).await;
        let id = body["session_id"].as_str().unwrap().to_string();
        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/solution"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "official");
        assert_eq!(body["solution"]["steps"][1]["result"], "R = 60 m");
        assert_eq!(body["common_mistakes"].as_array().unwrap().len(), 1);
    }
}
