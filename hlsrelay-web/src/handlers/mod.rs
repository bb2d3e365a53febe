//! HTTP request handlers organized by functionality

pub mod control;
pub mod playlists;

// Re-export handler functions
pub use control::{SetCurrentIdRequest, api_set_current_id, api_start, api_status, api_stop};
pub use playlists::{master_playlist, media_playlist};
