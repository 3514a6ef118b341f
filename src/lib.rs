//! RoadGuard severity kernel
//!
//! Classification and reporting core for pothole detections. Object detection,
//! camera capture and HTTP serving live outside this crate; the kernel receives
//! already-decoded detections and produces severity labels, rolling statistics
//! and report artifacts.
//!
//! # Data flow
//!
//! 1. The detector reports `RawDetection`s (corner box, confidence, frame size).
//! 2. `DetectionPipeline` drops detections at or below the confidence cutoff.
//! 3. `classify` labels each surviving box Low/Medium/High by its share of the frame.
//! 4. Labeled `DetectionEvent`s are appended to a bounded, shared `EventStore`.
//! 5. The `report` module summarizes a snapshot of the store and renders
//!    markdown/JSON reports.
//!
//! # Module Structure
//!
//! - `severity`: geometry types, `SeverityThresholds`, `classify`
//! - `detect`: detector boundary types and the labeling pipeline
//! - `store`: bounded FIFO of recent events
//! - `report`: summaries, bands, markdown and JSON rendering
//! - `config`: file + environment configuration
//! - `error`: typed failures

pub mod config;
pub mod detect;
pub mod error;
pub mod log;
pub mod report;
pub mod severity;
pub mod store;

pub use config::RoadguardConfig;
pub use detect::{ConfidenceFilter, DetectionEvent, DetectionPipeline, DetectionRecord, RawDetection};
pub use error::{Result, RoadguardError};
pub use report::{
    classify_into_bands, render_json, render_markdown, summarize, Band, BandThresholds,
    RenderOptions, ReportData, Summary,
};
pub use severity::{classify, BoundingBox, FrameDimensions, SeverityLabel, SeverityThresholds};
pub use store::{EventStore, SeverityCounts, StoreSnapshot};
