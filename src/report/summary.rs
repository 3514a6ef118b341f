use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use crate::detect::DetectionEvent;
use crate::store::SeverityCounts;

/// Confidence above which a detection counts toward the accuracy figure.
pub const DEFAULT_HIGH_CONFIDENCE_CUTOFF: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryOptions {
    pub high_confidence_cutoff: f64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            high_confidence_cutoff: DEFAULT_HIGH_CONFIDENCE_CUTOFF,
        }
    }
}

/// Statistics over one consistent batch of events.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Distinct frames the events came from.
    pub frames: usize,
    pub counts: SeverityCounts,
    pub average_confidence: f64,
    /// Events with confidence strictly above the high-confidence cutoff.
    pub high_confidence: usize,
    /// Span between the earliest and latest event timestamps.
    pub elapsed_ms: Option<u64>,
    /// Events per second over `elapsed_ms`, when that span is non-zero.
    pub rate_per_sec: Option<f64>,
    /// Frames per second over `elapsed_ms`, when that span is non-zero.
    pub fps: Option<f64>,
}

impl Summary {
    /// Share of high-confidence events, as a percentage.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.high_confidence as f64 / self.total as f64 * 100.0
    }

    /// Metrics mapping suitable for [`render_markdown`](super::render_markdown).
    pub fn to_report_data(&self) -> Map<String, Value> {
        let mut detections = Map::new();
        detections.insert("total_frames".into(), json!(self.frames));
        detections.insert("total_detections".into(), json!(self.total));
        detections.insert("high".into(), json!(self.counts.high));
        detections.insert("medium".into(), json!(self.counts.medium));
        detections.insert("low".into(), json!(self.counts.low));
        detections.insert("high_confidence".into(), json!(self.high_confidence));

        let mut quality = Map::new();
        quality.insert("accuracy".into(), json!(round2(self.accuracy_percent())));
        quality.insert(
            "avg_confidence".into(),
            json!(round2(self.average_confidence * 100.0)),
        );

        let mut timing = Map::new();
        if let Some(elapsed_ms) = self.elapsed_ms {
            timing.insert(
                "processing_time".into(),
                json!(round2(elapsed_ms as f64 / 1000.0)),
            );
        }
        if let Some(fps) = self.fps {
            timing.insert("avg_fps".into(), json!(round2(fps)));
        }
        if let Some(rate) = self.rate_per_sec {
            timing.insert("detection_rate".into(), json!(round2(rate)));
        }

        let mut data = Map::new();
        data.insert("detections".into(), Value::Object(detections));
        data.insert("detection_quality".into(), Value::Object(quality));
        if !timing.is_empty() {
            data.insert("timing".into(), Value::Object(timing));
        }
        data
    }
}

pub fn summarize(events: &[DetectionEvent]) -> Summary {
    summarize_with(events, &SummaryOptions::default())
}

pub fn summarize_with(events: &[DetectionEvent], options: &SummaryOptions) -> Summary {
    if events.is_empty() {
        return Summary::default();
    }

    let total = events.len();
    let confidence_sum: f64 = events.iter().map(|ev| ev.confidence()).sum();
    let high_confidence = events
        .iter()
        .filter(|ev| ev.confidence() > options.high_confidence_cutoff)
        .count();

    let first = events.iter().map(|ev| ev.timestamp_ms()).min().unwrap_or(0);
    let last = events.iter().map(|ev| ev.timestamp_ms()).max().unwrap_or(0);
    let elapsed_ms = last - first;
    let frames = events
        .iter()
        .map(|ev| ev.frame_id())
        .collect::<BTreeSet<_>>()
        .len();
    let per_second = |n: usize| (elapsed_ms > 0).then(|| n as f64 / (elapsed_ms as f64 / 1000.0));

    Summary {
        total,
        frames,
        counts: SeverityCounts::tally(events),
        average_confidence: confidence_sum / total as f64,
        high_confidence,
        elapsed_ms: Some(elapsed_ms),
        rate_per_sec: per_second(total),
        fps: per_second(frames),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
