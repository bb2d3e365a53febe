//! HLS Relay Web - control API and playlist server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
//!
//! Exposes the relay control interface as a small JSON API and serves the
//! master and media playlists to players.

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::WebError;
pub use server::{AppState, build_router, run_server};
