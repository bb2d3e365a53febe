//! M3U8 rendering for the master and media playlists.

use std::fmt::Write;

use crate::config::PlaylistConfig;
use crate::playlist::state::PlaylistState;

/// MIME type served with both playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

const PLAYLIST_VERSION: u8 = 3;

/// Renders the live media playlist for the current window.
///
/// Pure function of its inputs: identical state renders identical bytes.
pub fn render_media(state: &PlaylistState, config: &PlaylistConfig) -> String {
    let mut playlist = String::with_capacity(128 + state.len() * 96);
    let duration = config.segment_duration.as_secs_f64();

    // Writing into a String cannot fail.
    let _ = writeln!(playlist, "#EXTM3U");
    let _ = writeln!(playlist, "#EXT-X-VERSION:{PLAYLIST_VERSION}");
    let _ = writeln!(
        playlist,
        "#EXT-X-TARGETDURATION:{}",
        config.target_duration_secs()
    );
    let _ = writeln!(playlist, "#EXT-X-MEDIA-SEQUENCE:{}", state.media_sequence());

    for segment in state.segments() {
        let _ = writeln!(playlist, "#EXTINF:{duration:.3},");
        let _ = writeln!(playlist, "{}", segment.url());
    }

    playlist
}

/// Renders the master playlist advertising the single variant stream.
pub fn render_master(config: &PlaylistConfig) -> String {
    format!(
        "#EXTM3U\n#EXT-X-VERSION:{PLAYLIST_VERSION}\n#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}x{}\n{}\n",
        config.bandwidth, config.resolution.width, config.resolution.height, config.media_path
    )
}
