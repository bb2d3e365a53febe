//! Segment discovery against the origin.
//!
//! Predicts the next segment id from the current one, verifies candidates
//! with sequential existence probes, and rate-limits discovery passes.

pub mod engine;
pub mod probe;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks;
pub mod throttle;

pub use engine::DiscoveryEngine;
pub use probe::{HttpSegmentProbe, SegmentProbe};
#[cfg(any(test, feature = "test-utils"))]
pub use test_mocks::ScriptedProbe;
pub use throttle::ProbeThrottle;
