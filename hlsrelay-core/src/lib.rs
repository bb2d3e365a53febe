//! HLS Relay Core - segment discovery and playlist state
//!
//! This crate probes a remote origin for newly published transport-stream
//! segments, keeps a bounded window of verified segment URLs, and renders
//! the master and media playlists that advertise them.

pub mod config;
pub mod discovery;
pub mod playlist;
pub mod relay;
pub mod segment;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::RelayConfig;
pub use discovery::{DiscoveryEngine, HttpSegmentProbe, ProbeThrottle, SegmentProbe};
pub use playlist::{PLAYLIST_CONTENT_TYPE, PlaylistState, render_master, render_media};
pub use relay::{RelayController, RelayStatus, StartOutcome, StopOutcome, TickOutcome};
pub use segment::{Segment, SegmentId, SegmentUrlTemplate};

/// Errors surfaced by the relay control interface.
///
/// Probe failures and exhausted discovery passes are expected outcomes of
/// normal operation and are reported as values, never through this type.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid segment id: {input:?}")]
    InvalidId { input: String },

    #[error("No current segment id has been set")]
    CurrentIdNotSet,

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::InvalidId { .. } => "Invalid segment id".to_string(),
            RelayError::CurrentIdNotSet => "Set the current segment id first".to_string(),
            RelayError::Configuration { reason } => format!("Configuration error: {reason}"),
            RelayError::HttpClient(_) => "HTTP client could not be created".to_string(),
            RelayError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidId { .. } | RelayError::CurrentIdNotSet
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
