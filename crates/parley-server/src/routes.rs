use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info_span, Instrument};

use parley_core::ids::RequestId;
use parley_engine::TurnManager;

use crate::error::ApiError;

/// Shared application state passed to the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TurnManager>,
    pub expose_internal_errors: bool,
}

/// Largest accepted request body. Comfortably above a maximal message even
/// when every character arrives as a JSON escape.
pub const MAX_BODY_BYTES: usize = 128 * 1024;

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    session_id: String,
}

/// Build the router. Every request goes through [`dispatch`].
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    ApiError::internal().into_response()
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = RequestId::new();
    let span = info_span!("request", request_id = %request_id, %method, path = uri.path());

    async move {
        let path = uri.path();
        if path.ends_with("/health") {
            return health().into_response();
        }
        if path.ends_with("/chat") && method == Method::POST {
            return match chat(&state, body).await {
                Ok(resp) => Json(resp).into_response(),
                Err(err) => err.into_response(),
            };
        }
        debug!("no route");
        ApiError::not_found().into_response()
    }
    .instrument(span)
    .await
}

fn health() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn chat(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<ChatResponse, ApiError> {
    let body = body.map_err(|rejection| {
        debug!(status = %rejection.status(), "request body rejected");
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let payload = parse_body(&body)?;
    let field = |name: &str| payload.get(name).and_then(Value::as_str).unwrap_or_default();

    let reply = state
        .manager
        .chat(field("session_id"), field("message"))
        .await
        .map_err(|e| ApiError::from_chat(e, state.expose_internal_errors))?;

    Ok(ChatResponse {
        reply: reply.reply,
        session_id: reply.session_id,
    })
}

/// An empty body reads as `{}`. Anything that is not a JSON object is a
/// client error.
fn parse_body(body: &[u8]) -> Result<serde_json::Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Invalid JSON body: {e}"))),
    }
}
