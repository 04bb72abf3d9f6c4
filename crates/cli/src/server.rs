//! HTTP front door.
//!
//! `POST /ask_rag` (also mounted at `/api/ask_rag`, the Azure Functions
//! route) and `GET /health`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hurtbot_knowledge::Assistant;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

const MISSING_QUESTION_BODY: &str = "Brak pytania";
const BAD_JSON_BODY: &str = "Zła struktura JSON";
const INTERNAL_SERVER_ERROR_BODY: &str = "Wystąpił błąd wewnętrzny serwera.";

/// Shared state of the HTTP handlers.
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub request_timeout: Duration,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask_rag", post(ask_rag))
        .route("/api/ask_rag", post(ask_rag))
        .route("/health", get(health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                id = %uuid::Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
}

async fn ask_rag(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let question = match parse_question(&body) {
        Ok(question) => question,
        Err(rejection) => {
            tracing::warn!("Rejected request: {}", rejection.1);
            return rejection.into_response();
        }
    };

    tracing::info!("Received question: {}", question);

    match tokio::time::timeout(state.request_timeout, state.assistant.ask(&question)).await {
        Ok(answer) => Json(serde_json::json!({ "answer": answer.text })).into_response(),
        Err(_) => {
            tracing::error!(
                "Request timed out after {}s",
                state.request_timeout.as_secs_f32()
            );
            internal_error()
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "products": state.assistant.catalog().len(),
    }))
}

/// Question text of a request body, or the 400 response to send.
fn parse_question(body: &[u8]) -> Result<String, (StatusCode, &'static str)> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| (StatusCode::BAD_REQUEST, BAD_JSON_BODY))?;

    let object = value
        .as_object()
        .ok_or((StatusCode::BAD_REQUEST, BAD_JSON_BODY))?;

    object
        .get("question")
        .and_then(|q| q.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or((StatusCode::BAD_REQUEST, MISSING_QUESTION_BODY))
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY).into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    internal_error()
}
