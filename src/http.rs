use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::TutorService;

/// Build the HTTP boundary around the routing core. The service is called
/// cross-origin from a web frontend, so CORS is open.
pub fn router(service: Arc<TutorService>) -> Router {
    Router::new()
        .route("/ask_ai", post(ask_ai))
        .route("/health", get(|| async { "ok" }))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// API endpoint to receive a question and return a structured AI response.
///
/// The body is parsed as a loose JSON value so a missing `question` field and
/// a malformed body both yield the contract's exact 400 message. Everything
/// past that point is HTTP 200; callers branch on the `status` field.
async fn ask_ai(
    State(service): State<Arc<TutorService>>,
    body: Option<Json<Value>>,
) -> Response {
    let question = body
        .as_ref()
        .and_then(|Json(value)| value.get("question"))
        .and_then(|q| q.as_str());

    let Some(question) = question else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "Invalid request. 'question' field is required."
            })),
        )
            .into_response();
    };

    tracing::info!("question: {}", question);
    let result = service.answer(question).await;
    Json(result).into_response()
}
