//! JSON control API for the relay.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use hlsrelay_core::{RelayError, RelayStatus, SegmentId, SegmentProbe, StartOutcome, StopOutcome};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::WebError;
use crate::server::AppState;

/// Body of `POST /set-current-id`.
///
/// `id` may be a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct SetCurrentIdRequest {
    /// Segment id to reseed the stream at
    #[serde(default)]
    pub id: Option<Value>,
}

impl SetCurrentIdRequest {
    /// Extracts a valid segment id from the request.
    ///
    /// # Errors
    /// - `RelayError::InvalidId` - The id is absent, not an integer, or zero
    pub fn segment_id(&self) -> Result<SegmentId, RelayError> {
        match &self.id {
            Some(Value::Number(number)) => number
                .as_u64()
                .ok_or_else(|| RelayError::InvalidId {
                    input: number.to_string(),
                })
                .and_then(SegmentId::new),
            Some(Value::String(text)) => text.parse(),
            Some(other) => Err(RelayError::InvalidId {
                input: other.to_string(),
            }),
            None => Err(RelayError::InvalidId {
                input: String::new(),
            }),
        }
    }
}

/// Reseeds the stream at the given id, clearing the window.
///
/// # Errors
/// - `WebError::InvalidBody` - Body is not JSON
/// - `WebError::Relay` - The id is missing or invalid
pub async fn api_set_current_id<P: SegmentProbe + 'static>(
    State(state): State<AppState<P>>,
    payload: Result<Json<SetCurrentIdRequest>, JsonRejection>,
) -> Result<Json<Value>, WebError> {
    let Json(request) = payload.map_err(|rejection| WebError::InvalidBody {
        reason: rejection.body_text(),
    })?;

    let id = request.segment_id()?;
    state.relay.set_current_id(id);

    Ok(Json(json!({
        "message": "current id updated",
        "currentId": id,
    })))
}

/// Starts the discovery ticker.
///
/// # Errors
/// - `WebError::Relay` - No current id has been set
pub async fn api_start<P: SegmentProbe + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Json<Value>, WebError> {
    let message = match state.relay.start()? {
        StartOutcome::Started => "started",
        StartOutcome::AlreadyRunning => "already running",
    };
    Ok(Json(json!({ "message": message })))
}

/// Stops the discovery ticker.
pub async fn api_stop<P: SegmentProbe + 'static>(State(state): State<AppState<P>>) -> Json<Value> {
    let message = match state.relay.stop() {
        StopOutcome::Stopped => "stopped",
        StopOutcome::NotRunning => "not running",
    };
    Json(json!({ "message": message }))
}

/// Reports ticker state, current id and window size.
pub async fn api_status<P: SegmentProbe + 'static>(
    State(state): State<AppState<P>>,
) -> Json<RelayStatus> {
    Json(state.relay.status())
}
