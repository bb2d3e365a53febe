//! Result values reported by the relay controller.

use serde::Serialize;

use crate::segment::SegmentId;

/// Result of asking the relay to start its ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of asking the relay to stop its ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// What a single scheduled tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick is still probing
    Busy,
    /// The minimum probe interval has not elapsed
    Throttled,
    /// No current id to discover from
    NoCurrentId,
    /// Every candidate failed its probe
    Exhausted,
    /// The current id was reset while probing; the result was discarded
    Superseded,
    /// A new segment was appended to the window
    Discovered(SegmentId),
}

impl TickOutcome {
    /// Whether this tick sent any probe to the origin.
    pub fn probed(self) -> bool {
        matches!(
            self,
            TickOutcome::Exhausted | TickOutcome::Superseded | TickOutcome::Discovered(_)
        )
    }
}

/// Snapshot of the relay reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub running: bool,
    pub current_id: Option<SegmentId>,
    pub segments_count: usize,
    pub media_sequence: u64,
}
