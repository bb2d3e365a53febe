//! Next-segment prediction and verification.

use std::time::Duration;

use crate::config::DiscoveryConfig;
use crate::discovery::probe::SegmentProbe;
use crate::segment::{SegmentId, SegmentUrlTemplate};

/// Finds the segment that follows a known one on the origin.
///
/// The expected successor is `current + stride`. When it is missing, the
/// configured fallback offsets around it are tried in order. Probes run
/// one at a time and the first hit wins, so the origin sees at most one
/// request per candidate and never more candidates than necessary.
pub struct DiscoveryEngine<P: SegmentProbe> {
    probe: P,
    template: SegmentUrlTemplate,
    stride: u64,
    fallback_offsets: Vec<i64>,
    probe_timeout: Duration,
}

impl<P: SegmentProbe> DiscoveryEngine<P> {
    pub fn new(probe: P, template: SegmentUrlTemplate, config: &DiscoveryConfig) -> Self {
        Self {
            probe,
            template,
            stride: config.stride,
            fallback_offsets: config.fallback_offsets.clone(),
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn template(&self) -> &SegmentUrlTemplate {
        &self.template
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Candidate ids in probe order: the expected id, then each fallback.
    ///
    /// Candidates that would leave the valid id range are skipped.
    pub fn candidates(&self, current: SegmentId) -> Vec<SegmentId> {
        let Some(expected) = i64::try_from(self.stride)
            .ok()
            .and_then(|stride| current.offset(stride))
        else {
            return Vec::new();
        };

        std::iter::once(expected)
            .chain(
                self.fallback_offsets
                    .iter()
                    .filter_map(|offset| expected.offset(*offset)),
            )
            .collect()
    }

    /// Returns the first candidate after `current` that the origin serves.
    ///
    /// Returns `None` immediately, without probing, when `current` is unset.
    pub async fn discover_next(&self, current: Option<SegmentId>) -> Option<SegmentId> {
        let current = current?;

        for candidate in self.candidates(current) {
            if self.verify(candidate).await {
                return Some(candidate);
            }
            tracing::info!(segment_id = %candidate, "Segment not found");
        }

        None
    }

    /// Probes one candidate, treating a timeout as "not found".
    ///
    /// The probe future is dropped on timeout, which releases its
    /// connection.
    pub async fn verify(&self, id: SegmentId) -> bool {
        let url = self.template.url_for(id);
        match tokio::time::timeout(self.probe_timeout, self.probe.exists(&url)).await {
            Ok(found) => found,
            Err(_) => {
                tracing::debug!(
                    segment_id = %id,
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Probe timed out"
                );
                false
            }
        }
    }
}
