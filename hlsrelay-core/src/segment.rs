//! Segment identifiers and URL derivation.
//!
//! The origin publishes segments as `<base_url><prefix><id><extension>`.
//! Ids are opaque positive integers; consecutive segments are usually a
//! fixed stride apart with a small jitter.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::RelayError;
use crate::config::OriginConfig;

/// Numeric identifier of a segment on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SegmentId(u64);

impl SegmentId {
    /// Creates a segment id, rejecting zero.
    ///
    /// # Errors
    /// - `RelayError::InvalidId` - The value is zero
    pub fn new(value: u64) -> Result<Self, RelayError> {
        if value == 0 {
            return Err(RelayError::InvalidId {
                input: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Returns the raw numeric value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Applies a signed offset, returning `None` if the result is not a valid id.
    pub fn offset(self, delta: i64) -> Option<Self> {
        self.0
            .checked_add_signed(delta)
            .filter(|value| *value > 0)
            .map(Self)
    }
}

impl FromStr for SegmentId {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || RelayError::InvalidId {
            input: s.to_string(),
        };

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let value = trimmed.parse::<u64>().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds segment URLs from the origin's naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentUrlTemplate {
    base_url: String,
    file_prefix: String,
    extension: String,
}

impl SegmentUrlTemplate {
    pub fn new(
        base_url: impl Into<String>,
        file_prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            file_prefix: file_prefix.into(),
            extension: extension.into(),
        }
    }

    pub fn from_origin(origin: &OriginConfig) -> Self {
        Self::new(&origin.base_url, &origin.file_prefix, &origin.extension)
    }

    /// Returns the absolute URL of the segment with the given id.
    pub fn url_for(&self, id: SegmentId) -> String {
        format!(
            "{}{}{}{}",
            self.base_url, self.file_prefix, id, self.extension
        )
    }

    /// Recovers the segment id from a URL produced by this template.
    pub fn id_from_url(&self, url: &str) -> Option<SegmentId> {
        url.strip_prefix(&self.base_url)?
            .strip_prefix(&self.file_prefix)?
            .strip_suffix(&self.extension)?
            .parse()
            .ok()
    }
}

/// A verified segment advertised in the media playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: SegmentId,
    url: String,
}

impl Segment {
    pub fn from_template(id: SegmentId, template: &SegmentUrlTemplate) -> Self {
        Self {
            id,
            url: template.url_for(id),
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
