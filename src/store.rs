//! Detection event store.
//!
//! Bounded FIFO of recent detection events shared by every producer in the
//! process. A single mutex guards the ring; each operation holds it only for
//! its own O(1)/O(capacity) body and never across I/O or inference.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::detect::{DetectionEvent, DetectionRecord};
use crate::error::{Result, RoadguardError};
use crate::severity::SeverityLabel;

/// Number of events kept by the live dashboard.
pub const DEFAULT_CAPACITY: usize = 100;

/// Number of events shown in the dashboard's recent list.
pub const DEFAULT_RECENT_WINDOW: usize = 10;

/// Per-label event counts. Every label is always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, label: SeverityLabel) {
        match label {
            SeverityLabel::Low => self.low += 1,
            SeverityLabel::Medium => self.medium += 1,
            SeverityLabel::High => self.high += 1,
        }
    }

    pub fn get(&self, label: SeverityLabel) -> usize {
        match label {
            SeverityLabel::Low => self.low,
            SeverityLabel::Medium => self.medium,
            SeverityLabel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    pub fn tally<'a>(events: impl IntoIterator<Item = &'a DetectionEvent>) -> Self {
        let mut counts = Self::default();
        for ev in events {
            counts.record(ev.severity());
        }
        counts
    }
}

/// Aggregate view served to the dashboard: `{ total, high, medium, low, detections }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub detections: Vec<DetectionRecord>,
}

pub struct EventStore {
    events: Mutex<VecDeque<DetectionEvent>>,
    capacity: usize,
}

impl EventStore {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RoadguardError::config("event store capacity must be > 0"));
        }
        Ok(Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one event, evicting the oldest when full.
    pub fn append(&self, event: DetectionEvent) {
        let mut events = self.lock();
        Self::push_bounded(&mut events, self.capacity, event);
    }

    /// Append a batch in order under one lock acquisition.
    pub fn append_all(&self, batch: impl IntoIterator<Item = DetectionEvent>) {
        let mut events = self.lock();
        for event in batch {
            Self::push_bounded(&mut events, self.capacity, event);
        }
    }

    /// The last `n` events, oldest first. `n` is clamped to the current size.
    pub fn recent(&self, n: usize) -> Vec<DetectionEvent> {
        let events = self.lock();
        let skip = events.len().saturating_sub(n);
        events.iter().skip(skip).cloned().collect()
    }

    pub fn count_by_severity(&self) -> SeverityCounts {
        SeverityCounts::tally(self.lock().iter())
    }

    /// Counts plus the last `window` events, read under a single lock.
    pub fn snapshot(&self, window: usize) -> StoreSnapshot {
        let events = self.lock();
        let counts = SeverityCounts::tally(events.iter());
        let skip = events.len().saturating_sub(window);
        StoreSnapshot {
            total: events.len(),
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
            detections: events.iter().skip(skip).map(|ev| ev.record()).collect(),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push_bounded(events: &mut VecDeque<DetectionEvent>, capacity: usize, event: DetectionEvent) {
        while events.len() >= capacity {
            if let Some(evicted) = events.pop_front() {
                log::debug!(
                    "event store full ({}), evicted frame {} event",
                    capacity,
                    evicted.frame_id()
                );
            }
        }
        events.push_back(event);
    }

    // Every critical section leaves the deque consistent, so a panic in
    // another holder does not invalidate the data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<DetectionEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            log::warn!("event store lock poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(DEFAULT_CAPACITY)),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::BoundingBox;

    fn make_event(frame_id: u64, severity: SeverityLabel) -> DetectionEvent {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        DetectionEvent::new(bbox, 0.6, severity, 1_000 + frame_id, frame_id).unwrap()
    }

    #[test]
    fn store_enforces_capacity() {
        let store = EventStore::new(100).unwrap();
        for i in 1..=105 {
            store.append(make_event(i, SeverityLabel::Low));
        }
        assert_eq!(store.len(), 100);

        let ids: Vec<u64> = store.recent(5).iter().map(|ev| ev.frame_id()).collect();
        assert_eq!(ids, vec![101, 102, 103, 104, 105]);

        let all: Vec<u64> = store.recent(100).iter().map(|ev| ev.frame_id()).collect();
        assert_eq!(all, (6..=105).collect::<Vec<_>>());
    }

    #[test]
    fn recent_clamps_to_size() {
        let store = EventStore::new(10).unwrap();
        assert!(store.recent(3).is_empty());
        store.append(make_event(1, SeverityLabel::Low));
        store.append(make_event(2, SeverityLabel::High));
        let ids: Vec<u64> = store.recent(50).iter().map(|ev| ev.frame_id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.recent(0).is_empty());
    }

    #[test]
    fn counts_only_retained_events() {
        let store = EventStore::new(3).unwrap();
        assert_eq!(store.count_by_severity(), SeverityCounts::default());

        store.append(make_event(1, SeverityLabel::High));
        store.append(make_event(2, SeverityLabel::Low));
        store.append(make_event(3, SeverityLabel::Medium));
        store.append(make_event(4, SeverityLabel::Low));

        let counts = store.count_by_severity();
        assert_eq!(counts.high, 0);
        assert_eq!(counts.low, 2);
        assert_eq!(counts.medium, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn snapshot_matches_dashboard_shape() {
        let store = EventStore::new(20).unwrap();
        for i in 0..12 {
            let label = SeverityLabel::ALL[(i % 3) as usize];
            store.append(make_event(i, label));
        }
        let snap = store.snapshot(DEFAULT_RECENT_WINDOW);
        assert_eq!(snap.total, 12);
        assert_eq!(snap.low + snap.medium + snap.high, 12);
        assert_eq!(snap.detections.len(), 10);
        assert_eq!(snap.detections[0].frame_id, 2);
        assert_eq!(snap.detections[9].frame_id, 11);

        let json = serde_json::to_value(&snap).unwrap();
        for key in ["total", "high", "medium", "low", "detections"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn clear_empties_store() {
        let store = EventStore::new(4).unwrap();
        store.append_all((0..4).map(|i| make_event(i, SeverityLabel::Medium)));
        assert_eq!(store.len(), 4);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.count_by_severity().total(), 0);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            EventStore::new(0),
            Err(RoadguardError::InvalidConfiguration(_))
        ));
    }
}
