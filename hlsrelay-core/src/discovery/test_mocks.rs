//! Mock probe for exercising discovery without a network.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::probe::SegmentProbe;
use crate::segment::{SegmentId, SegmentUrlTemplate};

/// Probe answering from a scripted set of existing segments.
///
/// Clones share state, so a test can keep one clone to publish segments
/// and inspect the probe log while the relay owns another.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    template: SegmentUrlTemplate,
    existing: Arc<Mutex<HashSet<SegmentId>>>,
    probed: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedProbe {
    /// Creates a probe for which no segment exists yet.
    pub fn new(template: SegmentUrlTemplate) -> Self {
        Self {
            template,
            existing: Arc::new(Mutex::new(HashSet::new())),
            probed: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Delays every probe answer, for exercising probe timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes the given segments available on the mock origin.
    pub fn publish(&self, ids: impl IntoIterator<Item = u64>) {
        let mut existing = self.existing.lock();
        for id in ids {
            if let Ok(id) = SegmentId::new(id) {
                existing.insert(id);
            }
        }
    }

    /// URLs probed so far, in probe order.
    pub fn probed_urls(&self) -> Vec<String> {
        self.probed.lock().clone()
    }

    /// Ids probed so far, in probe order.
    pub fn probed_ids(&self) -> Vec<u64> {
        self.probed
            .lock()
            .iter()
            .filter_map(|url| self.template.id_from_url(url))
            .map(SegmentId::value)
            .collect()
    }

    pub fn probe_count(&self) -> usize {
        self.probed.lock().len()
    }
}

#[async_trait]
impl SegmentProbe for ScriptedProbe {
    async fn exists(&self, url: &str) -> bool {
        self.probed.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.template
            .id_from_url(url)
            .is_some_and(|id| self.existing.lock().contains(&id))
    }
}
