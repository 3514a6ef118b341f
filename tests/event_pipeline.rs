//! Pipeline and store behaviour under concurrent producers.

use std::sync::Arc;
use std::thread;

use roadguard::detect::{ConfidenceFilter, DetectionPipeline, RawDetection};
use roadguard::report::summarize;
use roadguard::severity::{SeverityLabel, SeverityThresholds};
use roadguard::store::EventStore;

const FRAME: [u32; 2] = [1000, 1000];

fn pipeline(capacity: usize) -> DetectionPipeline {
    DetectionPipeline::new(
        SeverityThresholds::detector(),
        ConfidenceFilter::new(0.5).expect("filter"),
        Arc::new(EventStore::new(capacity).expect("store")),
    )
}

/// One detection per severity band at 1000x1000.
fn frame_detections() -> Vec<RawDetection> {
    vec![
        RawDetection::new(0.9, [0.0, 0.0, 50.0, 50.0], FRAME),
        RawDetection::new(0.8, [0.0, 0.0, 100.0, 100.0], FRAME),
        RawDetection::new(0.7, [0.0, 0.0, 500.0, 500.0], FRAME),
        RawDetection::new(0.2, [0.0, 0.0, 500.0, 500.0], FRAME),
    ]
}

#[test]
fn concurrent_producers_respect_capacity() {
    let pipeline = pipeline(100);
    let producers = 8;
    let frames_per_producer = 50;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let pipeline = pipeline.clone();
            thread::spawn(move || {
                for f in 0..frames_per_producer {
                    let frame_id = (p * frames_per_producer + f) as u64;
                    pipeline
                        .ingest(frame_id, &frame_detections(), 1_000 + frame_id)
                        .expect("ingest");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread");
    }

    let store = pipeline.store();
    assert_eq!(store.len(), 100);

    let counts = store.count_by_severity();
    assert_eq!(counts.total(), 100);

    // Frames are appended as whole batches, so the retained window holds
    // complete Low/Medium/High triples apart from the oldest partial frame.
    let events = store.recent(100);
    let tail = &events[events.len() - 3..];
    assert_eq!(
        tail.iter().map(|ev| ev.severity()).collect::<Vec<_>>(),
        vec![SeverityLabel::Low, SeverityLabel::Medium, SeverityLabel::High]
    );
    assert!(tail.iter().all(|ev| ev.frame_id() == tail[0].frame_id()));
}

#[test]
fn snapshot_then_summarize() {
    let pipeline = pipeline(100);
    for frame_id in 0..105u64 {
        let detections = vec![RawDetection::new(0.75, [0.0, 0.0, 5.0, 5.0], FRAME)];
        pipeline
            .ingest(frame_id + 1, &detections, frame_id * 100)
            .expect("ingest");
    }

    let store = pipeline.store();
    let window: Vec<u64> = store.recent(5).iter().map(|ev| ev.frame_id()).collect();
    assert_eq!(window, vec![101, 102, 103, 104, 105]);

    let snapshot = store.snapshot(10);
    assert_eq!(snapshot.total, 100);
    assert_eq!(snapshot.low, 100);
    assert_eq!(snapshot.detections.len(), 10);
    assert_eq!(snapshot.detections.last().map(|d| d.frame_id), Some(105));

    let summary = summarize(&store.recent(store.capacity()));
    assert_eq!(summary.total, 100);
    assert_eq!(summary.frames, 100);
    assert_eq!(summary.counts.low, 100);
    assert_eq!(summary.average_confidence, 0.75);
    assert_eq!(summary.high_confidence, 100);
    // timestamps 500..=10400 ms
    assert_eq!(summary.elapsed_ms, Some(9_900));

    store.clear();
    assert!(store.is_empty());
    assert_eq!(summarize(&store.recent(10)).total, 0);
}
