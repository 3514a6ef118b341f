use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, RoadguardError};
use crate::severity::{BoundingBox, SeverityLabel};

/// A labeled, timestamped observation of one pothole.
///
/// Events are created once a raw detection clears the caller's confidence
/// cutoff and are never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionEvent {
    bbox: BoundingBox,
    confidence: f64,
    severity: SeverityLabel,
    timestamp_ms: u64,
    frame_id: u64,
}

impl DetectionEvent {
    pub fn new(
        bbox: BoundingBox,
        confidence: f64,
        severity: SeverityLabel,
        timestamp_ms: u64,
        frame_id: u64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(RoadguardError::detection(format!(
                "confidence {confidence} outside [0, 1]"
            )));
        }
        Ok(Self {
            bbox,
            confidence,
            severity,
            timestamp_ms,
            frame_id,
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn severity(&self) -> SeverityLabel {
        self.severity
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Flat wire shape handed to the presentation layer.
    pub fn record(&self) -> DetectionRecord {
        DetectionRecord {
            x: self.bbox.x(),
            y: self.bbox.y(),
            width: self.bbox.width(),
            height: self.bbox.height(),
            confidence: self.confidence,
            severity: self.severity,
            timestamp: self.timestamp_ms,
            frame_id: self.frame_id,
        }
    }
}

/// `{ x, y, width, height, confidence, severity, timestamp, frame_id }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    pub severity: SeverityLabel,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub frame_id: u64,
}

/// Wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_flattens_box_and_label() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0).unwrap();
        let ev = DetectionEvent::new(bbox, 0.9, SeverityLabel::High, 1_700_000_000_000, 7).unwrap();
        let json = serde_json::to_value(ev.record()).unwrap();
        assert_eq!(json["x"], 10.0);
        assert_eq!(json["width"], 30.0);
        assert_eq!(json["severity"], "High");
        assert_eq!(json["timestamp"], 1_700_000_000_000u64);
        assert_eq!(json["frame_id"], 7);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(DetectionEvent::new(bbox, -0.1, SeverityLabel::Low, 0, 0).is_err());
        assert!(DetectionEvent::new(bbox, 1.5, SeverityLabel::Low, 0, 0).is_err());
    }
}
