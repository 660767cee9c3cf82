use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parley_engine::ChatError;

pub const NOT_FOUND_MESSAGE: &str = "Path not found";
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: NOT_FOUND_MESSAGE.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: GENERIC_INTERNAL_MESSAGE.into(),
        }
    }

    /// Map a failed exchange to its response. Server-side failures carry the
    /// raw error text only when `expose_internal` is set.
    pub fn from_chat(err: ChatError, expose_internal: bool) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        tracing::error!(kind = err.error_kind(), error = %err, "chat request failed");
        if !expose_internal {
            return Self::internal();
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
