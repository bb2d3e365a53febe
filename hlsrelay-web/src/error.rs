//! HTTP mapping of relay errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hlsrelay_core::RelayError;
use serde_json::json;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Error reported by the relay controller
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Request body could not be read as the expected JSON
    #[error("Invalid request body: {reason}")]
    InvalidBody {
        /// Why the body was rejected
        reason: String,
    },
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::Relay(e) if e.is_user_error() => (StatusCode::BAD_REQUEST, e.user_message()),
            WebError::Relay(e) => {
                tracing::error!("Relay error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
            }
            WebError::InvalidBody { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
