use serde::Deserialize;

use crate::error::{Result, RoadguardError};
use crate::severity::{BoundingBox, FrameDimensions};

/// One object reported by the external detector, before any filtering.
///
/// Mirrors the collaborator's wire shape: corner coordinates in pixels and
/// the `(height, width)` of the frame they were measured against.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawDetection {
    pub confidence: f64,
    /// `[x1, y1, x2, y2]`
    pub bbox: [f64; 4],
    /// `[height, width]`
    pub frame_dimensions: [u32; 2],
}

impl RawDetection {
    pub fn new(confidence: f64, bbox: [f64; 4], frame_dimensions: [u32; 2]) -> Self {
        Self {
            confidence,
            bbox,
            frame_dimensions,
        }
    }

    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let [x1, y1, x2, y2] = self.bbox;
        BoundingBox::from_corners(x1, y1, x2, y2)
    }

    pub fn frame(&self) -> Result<FrameDimensions> {
        let [height, width] = self.frame_dimensions;
        FrameDimensions::new(height, width)
    }

    pub(crate) fn checked_confidence(&self) -> Result<f64> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(RoadguardError::detection(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collaborator_payload() {
        let raw: RawDetection = serde_json::from_str(
            r#"{"confidence": 0.82, "bbox": [10, 20, 110, 70], "frame_dimensions": [480, 640]}"#,
        )
        .unwrap();
        let bbox = raw.bounding_box().unwrap();
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 50.0);
        let frame = raw.frame().unwrap();
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.width(), 640);
    }

    #[test]
    fn confidence_outside_unit_interval_is_rejected() {
        let raw = RawDetection::new(1.2, [0.0, 0.0, 1.0, 1.0], [10, 10]);
        assert!(matches!(
            raw.checked_confidence(),
            Err(RoadguardError::InvalidDetection(_))
        ));
        let raw = RawDetection::new(f64::NAN, [0.0, 0.0, 1.0, 1.0], [10, 10]);
        assert!(raw.checked_confidence().is_err());
    }
}
