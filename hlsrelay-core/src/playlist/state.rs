//! Sliding window of verified segments.
//!
//! The window holds at most `capacity` segments, oldest first. Every
//! segment evicted from the front advances the media sequence by one so
//! that the sequence always numbers the first advertised segment.

use std::collections::VecDeque;

use crate::segment::{Segment, SegmentId};

#[derive(Debug, Clone)]
pub struct PlaylistState {
    current_id: Option<SegmentId>,
    media_sequence: u64,
    window: VecDeque<Segment>,
    capacity: usize,
    /// Bumped on every reset so in-flight discoveries can detect a reseed
    epoch: u64,
}

impl PlaylistState {
    /// Creates an empty window.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Playlist window capacity must be greater than zero");

        Self {
            current_id: None,
            media_sequence: 1,
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
            epoch: 0,
        }
    }

    /// Reseeds the stream at `id`, discarding the window.
    pub fn reset(&mut self, id: SegmentId) {
        self.current_id = Some(id);
        self.window.clear();
        self.media_sequence = 1;
        self.epoch += 1;
    }

    /// Appends a newly discovered segment and makes it current.
    ///
    /// Returns the number of segments evicted to stay within capacity.
    pub fn append(&mut self, segment: Segment) -> usize {
        self.current_id = Some(segment.id());
        self.window.push_back(segment);

        let mut evicted = 0;
        while self.window.len() > self.capacity {
            self.window.pop_front();
            self.media_sequence += 1;
            evicted += 1;
        }
        evicted
    }

    pub fn current_id(&self) -> Option<SegmentId> {
        self.current_id
    }

    pub fn media_sequence(&self) -> u64 {
        self.media_sequence
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Segments in playlist order, oldest first.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &Segment> {
        self.window.iter()
    }
}
