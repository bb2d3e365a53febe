//! Centralized configuration for the HLS relay.
//!
//! All tunable parameters are defined here so origin-specific numbers
//! (stride, fallback offsets, naming template) never leak into the
//! discovery logic. Configuration is fixed once the relay is built.

use std::time::Duration;

use crate::RelayError;

/// Routes served by the relay that the media playlist must not shadow.
const RESERVED_PATHS: &[&str] = &[
    "/master.m3u8",
    "/set-current-id",
    "/start",
    "/stop",
    "/status",
];

/// Central configuration for all relay components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub origin: OriginConfig,
    pub discovery: DiscoveryConfig,
    pub playlist: PlaylistConfig,
}

/// Where segments live on the origin and how their file names are built.
#[derive(Debug, Clone)]
pub struct OriginConfig {
    /// Directory URL that segment file names are appended to
    pub base_url: String,
    /// File name prefix preceding the numeric id
    pub file_prefix: String,
    /// File name suffix following the numeric id
    pub extension: String,
    /// User agent for probe requests
    pub user_agent: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/live/".to_string(),
            file_prefix: "segment_".to_string(),
            extension: ".ts".to_string(),
            user_agent: concat!("hlsrelay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Segment discovery and probe scheduling parameters.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Expected increment between consecutive segment ids
    pub stride: u64,
    /// Offsets from the expected id tried in order when it is missing
    pub fallback_offsets: Vec<i64>,
    /// Per-probe timeout
    pub probe_timeout: Duration,
    /// Period of the scheduler driving discovery ticks
    pub tick_period: Duration,
    /// Minimum time between two discovery passes
    pub min_probe_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            stride: 5000,
            fallback_offsets: vec![-1, 1, -2, 2],
            probe_timeout: Duration::from_millis(2000),
            tick_period: Duration::from_millis(1000),
            min_probe_interval: Duration::from_millis(4000),
        }
    }
}

/// Playlist window and rendering parameters.
#[derive(Debug, Clone)]
pub struct PlaylistConfig {
    /// Maximum number of segments advertised at once
    pub window_capacity: usize,
    /// Declared duration of every segment
    pub segment_duration: Duration,
    /// Bandwidth advertised by the master playlist
    pub bandwidth: u64,
    /// Resolution advertised by the master playlist
    pub resolution: Resolution,
    /// Path of the media playlist referenced by the master playlist
    pub media_path: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            window_capacity: 8,
            segment_duration: Duration::from_secs(5),
            bandwidth: 2_500_000,
            resolution: Resolution {
                width: 1280,
                height: 720,
            },
            media_path: "/live.m3u8".to_string(),
        }
    }
}

impl PlaylistConfig {
    /// Target duration in whole seconds, rounded up from the segment duration.
    pub fn target_duration_secs(&self) -> u64 {
        let duration = self.segment_duration;
        if duration.subsec_nanos() > 0 {
            duration.as_secs() + 1
        } else {
            duration.as_secs()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl RelayConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Every variable is optional; values that fail to parse are ignored
    /// and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Used by `from_env` and by tests that must not touch the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Origin overrides
        if let Some(base_url) = lookup("HLSRELAY_ORIGIN_BASE_URL") {
            config.origin.base_url = base_url;
        }
        if let Some(prefix) = lookup("HLSRELAY_FILE_PREFIX") {
            config.origin.file_prefix = prefix;
        }
        if let Some(extension) = lookup("HLSRELAY_EXTENSION") {
            config.origin.extension = extension;
        }

        // Discovery overrides
        if let Some(stride) = parse_var(&lookup, "HLSRELAY_STRIDE") {
            config.discovery.stride = stride;
        }
        if let Some(offsets) = lookup("HLSRELAY_FALLBACK_OFFSETS")
            && let Some(parsed) = parse_offsets(&offsets)
        {
            config.discovery.fallback_offsets = parsed;
        }
        if let Some(ms) = parse_var(&lookup, "HLSRELAY_PROBE_TIMEOUT_MS") {
            config.discovery.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "HLSRELAY_TICK_PERIOD_MS") {
            config.discovery.tick_period = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "HLSRELAY_MIN_PROBE_INTERVAL_MS") {
            config.discovery.min_probe_interval = Duration::from_millis(ms);
        }

        // Playlist overrides
        if let Some(capacity) = parse_var(&lookup, "HLSRELAY_WINDOW_CAPACITY") {
            config.playlist.window_capacity = capacity;
        }
        if let Some(ms) = parse_var(&lookup, "HLSRELAY_SEGMENT_DURATION_MS") {
            config.playlist.segment_duration = Duration::from_millis(ms);
        }

        config
    }

    /// Checks that the configuration can drive a relay.
    ///
    /// # Errors
    /// - `RelayError::Configuration` - A value is out of range or the origin URL is malformed
    pub fn validate(&self) -> Result<(), RelayError> {
        let invalid = |reason: &str| {
            Err(RelayError::Configuration {
                reason: reason.to_string(),
            })
        };

        if let Err(e) = url::Url::parse(&self.origin.base_url) {
            return Err(RelayError::Configuration {
                reason: format!("invalid origin base URL {:?}: {e}", self.origin.base_url),
            });
        }
        if !self.origin.base_url.ends_with('/') && self.origin.file_prefix.is_empty() {
            return invalid("origin base URL must end with '/' when the file prefix is empty");
        }
        if self.discovery.stride == 0 {
            return invalid("stride must be greater than zero");
        }
        if self.discovery.probe_timeout.is_zero() {
            return invalid("probe timeout must be greater than zero");
        }
        if self.discovery.tick_period.is_zero() {
            return invalid("tick period must be greater than zero");
        }
        if self.playlist.window_capacity == 0 {
            return invalid("window capacity must be greater than zero");
        }
        if self.playlist.segment_duration.is_zero() {
            return invalid("segment duration must be greater than zero");
        }
        if !self.playlist.media_path.starts_with('/') {
            return invalid("media playlist path must start with '/'");
        }
        if RESERVED_PATHS.contains(&self.playlist.media_path.as_str()) {
            return invalid("media playlist path collides with a built-in route");
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

fn parse_offsets(value: &str) -> Option<Vec<i64>> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_origin_conventions() {
        let config = RelayConfig::default();

        assert_eq!(config.discovery.stride, 5000);
        assert_eq!(config.discovery.fallback_offsets, vec![-1, 1, -2, 2]);
        assert_eq!(config.discovery.probe_timeout, Duration::from_millis(2000));
        assert_eq!(config.discovery.tick_period, Duration::from_millis(1000));
        assert_eq!(
            config.discovery.min_probe_interval,
            Duration::from_millis(4000)
        );
        assert_eq!(config.playlist.window_capacity, 8);
        assert_eq!(config.playlist.target_duration_secs(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("HLSRELAY_ORIGIN_BASE_URL", "http://cdn.test/stream/"),
            ("HLSRELAY_FILE_PREFIX", "chan_"),
            ("HLSRELAY_STRIDE", "4000"),
            ("HLSRELAY_FALLBACK_OFFSETS", "-1, 1, -3,3"),
            ("HLSRELAY_WINDOW_CAPACITY", "6"),
            ("HLSRELAY_SEGMENT_DURATION_MS", "4500"),
        ]));

        assert_eq!(config.origin.base_url, "http://cdn.test/stream/");
        assert_eq!(config.origin.file_prefix, "chan_");
        assert_eq!(config.discovery.stride, 4000);
        assert_eq!(config.discovery.fallback_offsets, vec![-1, 1, -3, 3]);
        assert_eq!(config.playlist.window_capacity, 6);
        assert_eq!(config.playlist.target_duration_secs(), 5);
    }

    #[test]
    fn test_unparsable_overrides_are_ignored() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("HLSRELAY_STRIDE", "lots"),
            ("HLSRELAY_FALLBACK_OFFSETS", "-1,x"),
            ("HLSRELAY_PROBE_TIMEOUT_MS", ""),
        ]));

        assert_eq!(config.discovery.stride, 5000);
        assert_eq!(config.discovery.fallback_offsets, vec![-1, 1, -2, 2]);
        assert_eq!(config.discovery.probe_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RelayConfig::default();
        config.discovery.stride = 0;
        assert!(matches!(
            config.validate(),
            Err(RelayError::Configuration { .. })
        ));

        let mut config = RelayConfig::default();
        config.playlist.window_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.origin.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.playlist.media_path = "live.m3u8".to_string();
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.playlist.media_path = "/master.m3u8".to_string();
        assert!(config.validate().is_err());
    }
}
