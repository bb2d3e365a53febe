//! Router construction and server entry point.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use hlsrelay_core::{RelayController, SegmentProbe};
use tower_http::cors::CorsLayer;

use crate::handlers::{
    api_set_current_id, api_start, api_status, api_stop, master_playlist, media_playlist,
};

/// Shared state handed to every handler.
pub struct AppState<P: SegmentProbe> {
    /// Controller of the relayed stream
    pub relay: RelayController<P>,
}

impl<P: SegmentProbe> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
        }
    }
}

/// Builds the router for one relayed stream.
///
/// The media playlist is mounted at the path configured for the relay so
/// the master playlist always points at it.
pub fn build_router<P: SegmentProbe + 'static>(relay: RelayController<P>) -> Router {
    let media_path = relay.config().playlist.media_path.clone();
    let state = AppState { relay };

    Router::new()
        // Control API
        .route("/set-current-id", post(api_set_current_id::<P>))
        .route("/start", post(api_start::<P>))
        .route("/stop", post(api_stop::<P>))
        .route("/status", get(api_status::<P>))
        // Playlists
        .route("/master.m3u8", get(master_playlist::<P>))
        .route(&media_path, get(media_playlist::<P>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the relay on `addr` until `shutdown` resolves.
///
/// The discovery ticker is stopped once the server has drained.
///
/// # Errors
/// - `std::io::Error` - The address could not be bound or the server failed
pub async fn run_server<P: SegmentProbe + 'static>(
    relay: RelayController<P>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(relay.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "HLS relay listening on http://{}{}",
        listener.local_addr()?,
        relay.config().playlist.media_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    relay.stop();
    tracing::info!("HLS relay shut down");
    Ok(())
}
