use std::sync::Arc;

use crate::error::{Result, RoadguardError};
use crate::severity::{classify, SeverityThresholds};
use crate::store::EventStore;

use super::event::DetectionEvent;
use super::result::RawDetection;

/// Cutoff used by the single-image detector endpoint.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Keeps detections whose confidence is strictly above the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfidenceFilter {
    threshold: f64,
}

impl ConfidenceFilter {
    /// Threshold must lie in `[0, 1)`; a threshold of 1 would reject everything.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&threshold) {
            return Err(RoadguardError::config(format!(
                "confidence threshold must be in [0, 1) (got {threshold})"
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn accepts(&self, confidence: f64) -> bool {
        confidence > self.threshold
    }
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Turns raw detector output into stored, labeled events.
///
/// Each call handles one frame: detections are filtered by confidence,
/// classified, and appended to the shared store as a single batch. Validation
/// happens before anything is appended, so a bad detection rejects the whole
/// frame and leaves the store untouched.
#[derive(Clone)]
pub struct DetectionPipeline {
    thresholds: SeverityThresholds,
    filter: ConfidenceFilter,
    store: Arc<EventStore>,
}

impl DetectionPipeline {
    pub fn new(
        thresholds: SeverityThresholds,
        filter: ConfidenceFilter,
        store: Arc<EventStore>,
    ) -> Self {
        Self {
            thresholds,
            filter,
            store,
        }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    pub fn filter(&self) -> &ConfidenceFilter {
        &self.filter
    }

    /// Label one frame's detections without touching the store.
    pub fn label(
        &self,
        frame_id: u64,
        detections: &[RawDetection],
        timestamp_ms: u64,
    ) -> Result<Vec<DetectionEvent>> {
        let mut events = Vec::new();
        for raw in detections {
            let confidence = raw.checked_confidence()?;
            if !self.filter.accepts(confidence) {
                log::trace!(
                    "frame {}: dropped detection with confidence {:.2}",
                    frame_id,
                    confidence
                );
                continue;
            }
            let bbox = raw.bounding_box()?;
            let frame = raw.frame()?;
            let severity = classify(&bbox, &frame, &self.thresholds)?;
            events.push(DetectionEvent::new(
                bbox,
                confidence,
                severity,
                timestamp_ms,
                frame_id,
            )?);
        }
        Ok(events)
    }

    /// Label one frame's detections and append the survivors to the store.
    pub fn ingest(
        &self,
        frame_id: u64,
        detections: &[RawDetection],
        timestamp_ms: u64,
    ) -> Result<Vec<DetectionEvent>> {
        let events = self.label(frame_id, detections, timestamp_ms)?;
        if !events.is_empty() {
            log::debug!(
                "frame {}: {} of {} detections stored",
                frame_id,
                events.len(),
                detections.len()
            );
            self.store.append_all(events.iter().cloned());
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::SeverityLabel;

    fn pipeline(threshold: f64, capacity: usize) -> DetectionPipeline {
        DetectionPipeline::new(
            SeverityThresholds::dashboard(),
            ConfidenceFilter::new(threshold).unwrap(),
            Arc::new(EventStore::new(capacity).unwrap()),
        )
    }

    #[test]
    fn filters_then_classifies_and_stores() {
        let p = pipeline(0.3, 10);
        let detections = vec![
            // 1% of a 1000x1000 frame
            RawDetection::new(0.9, [0.0, 0.0, 100.0, 100.0], [1000, 1000]),
            // at the cutoff: dropped
            RawDetection::new(0.3, [0.0, 0.0, 500.0, 500.0], [1000, 1000]),
            // 25% of the frame
            RawDetection::new(0.31, [0.0, 0.0, 500.0, 500.0], [1000, 1000]),
        ];
        let events = p.ingest(4, &detections, 123).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity(), SeverityLabel::Low);
        assert_eq!(events[1].severity(), SeverityLabel::High);
        assert!(events.iter().all(|ev| ev.frame_id() == 4 && ev.timestamp_ms() == 123));
        assert_eq!(p.store().len(), 2);
    }

    #[test]
    fn invalid_detection_leaves_store_untouched() {
        let p = pipeline(0.5, 10);
        let detections = vec![
            RawDetection::new(0.9, [0.0, 0.0, 10.0, 10.0], [100, 100]),
            RawDetection::new(0.9, [0.0, 0.0, 10.0, 10.0], [0, 100]),
        ];
        let err = p.ingest(1, &detections, 0).unwrap_err();
        assert!(matches!(err, RoadguardError::InvalidGeometry(_)));
        assert!(p.store().is_empty());
    }

    #[test]
    fn out_of_range_confidence_fails_even_when_filtered() {
        let p = pipeline(0.5, 10);
        let detections = vec![RawDetection::new(-0.2, [0.0, 0.0, 1.0, 1.0], [10, 10])];
        assert!(matches!(
            p.ingest(1, &detections, 0),
            Err(RoadguardError::InvalidDetection(_))
        ));
    }

    #[test]
    fn filter_threshold_must_be_below_one() {
        assert!(ConfidenceFilter::new(1.0).is_err());
        assert!(ConfidenceFilter::new(-0.01).is_err());
        assert!(ConfidenceFilter::new(0.0).is_ok());
    }
}
