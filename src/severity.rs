//! Severity classification.
//!
//! A pothole's severity is a coarse label derived from how much of the frame
//! its bounding box covers. The policy is a pure function of the box, the
//! frame and an explicit [`SeverityThresholds`] value:
//!
//! - `ratio < low_max` is `Low`
//! - `low_max <= ratio < medium_max` is `Medium`
//! - `ratio >= medium_max` is `High`
//!
//! A ratio sitting exactly on a cut point always lands in the higher band.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RoadguardError};

/// Axis-aligned box in pixel units of a specific frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(RoadguardError::geometry(format!(
                "bounding box has non-finite values ({x}, {y}, {width}, {height})"
            )));
        }
        if width < 0.0 || height < 0.0 {
            return Err(RoadguardError::geometry(format!(
                "bounding box dimensions must be >= 0 (width={width}, height={height})"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Build a box from detector corner coordinates `(x1, y1, x2, y2)`.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Source frame size in pixels. Both sides are non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameDimensions {
    height: u32,
    width: u32,
}

impl FrameDimensions {
    pub fn new(height: u32, width: u32) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(RoadguardError::geometry(format!(
                "frame area must be > 0 (height={height}, width={width})"
            )));
        }
        Ok(Self { height, width })
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn area(&self) -> u64 {
        u64::from(self.height) * u64::from(self.width)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLabel {
    Low,
    Medium,
    High,
}

impl SeverityLabel {
    pub const ALL: [SeverityLabel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two increasing ratio cut points splitting `[0, 1)` into Low/Medium/High.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeverityThresholds {
    low_max: f64,
    medium_max: f64,
}

impl SeverityThresholds {
    /// Requires `0 < low_max < medium_max < 1`.
    pub fn new(low_max: f64, medium_max: f64) -> Result<Self> {
        if !(low_max.is_finite() && medium_max.is_finite()) {
            return Err(RoadguardError::config(
                "severity thresholds must be finite numbers",
            ));
        }
        if !(0.0 < low_max && low_max < medium_max && medium_max < 1.0) {
            return Err(RoadguardError::config(format!(
                "severity thresholds must satisfy 0 < low_max < medium_max < 1 (low_max={low_max}, medium_max={medium_max})"
            )));
        }
        Ok(Self {
            low_max,
            medium_max,
        })
    }

    /// Cut points used by the single-image detector endpoint.
    pub fn detector() -> Self {
        Self {
            low_max: 0.01,
            medium_max: 0.05,
        }
    }

    /// Cut points used by the live dashboard.
    pub fn dashboard() -> Self {
        Self {
            low_max: 0.02,
            medium_max: 0.05,
        }
    }

    pub fn low_max(&self) -> f64 {
        self.low_max
    }

    pub fn medium_max(&self) -> f64 {
        self.medium_max
    }

    /// Bucket an already computed area ratio.
    pub fn label_for(&self, ratio: f64) -> SeverityLabel {
        if ratio < self.low_max {
            SeverityLabel::Low
        } else if ratio < self.medium_max {
            SeverityLabel::Medium
        } else {
            SeverityLabel::High
        }
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self::detector()
    }
}

/// Box area divided by frame area.
pub fn area_ratio(bbox: &BoundingBox, frame: &FrameDimensions) -> Result<f64> {
    let frame_area = frame.area();
    if frame_area == 0 {
        return Err(RoadguardError::geometry("frame area must be > 0"));
    }
    Ok(bbox.area() / frame_area as f64)
}

/// Label a detected box by the share of the frame it covers.
///
/// Callers are expected to have applied their confidence cutoff already.
pub fn classify(
    bbox: &BoundingBox,
    frame: &FrameDimensions,
    thresholds: &SeverityThresholds,
) -> Result<SeverityLabel> {
    let ratio = area_ratio(bbox, frame)?;
    Ok(thresholds.label_for(ratio))
}
