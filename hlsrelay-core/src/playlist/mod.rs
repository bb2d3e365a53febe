//! Playlist window state and M3U8 rendering.

pub mod render;
pub mod state;

pub use render::{PLAYLIST_CONTENT_TYPE, render_master, render_media};
pub use state::PlaylistState;
