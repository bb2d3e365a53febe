//! Minimum-interval gate for discovery passes.
//!
//! The scheduler fires more often than the origin should be probed; the
//! throttle lets a pass through only when enough time has elapsed since
//! the previous one started.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct ProbeThrottle {
    last_check: Option<Instant>,
    min_interval: Duration,
}

impl ProbeThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_check: None,
            min_interval,
        }
    }

    /// Admits a discovery pass at `now` if the minimum interval has elapsed.
    ///
    /// An admitted pass stamps `now` as the last check, whether or not the
    /// pass later finds a segment.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_check
            && now.saturating_duration_since(last) < self.min_interval
        {
            return false;
        }

        self.last_check = Some(now);
        true
    }

    pub fn last_check(&self) -> Option<Instant> {
        self.last_check
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
