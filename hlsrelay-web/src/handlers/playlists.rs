//! Playlist endpoints consumed by HLS players.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use hlsrelay_core::{PLAYLIST_CONTENT_TYPE, SegmentProbe};

use crate::server::AppState;

/// Serves the master playlist.
pub async fn master_playlist<P: SegmentProbe + 'static>(
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)],
        state.relay.master_playlist(),
    )
}

/// Serves the live media playlist.
///
/// The window changes every few seconds, so players must not cache it.
pub async fn media_playlist<P: SegmentProbe + 'static>(
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        state.relay.media_playlist(),
    )
}
