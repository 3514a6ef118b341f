//! Detection boundary.
//!
//! Object detection itself runs outside this crate. This module accepts the
//! detector's per-object output, applies the caller's confidence cutoff, labels
//! what survives and records it in the shared [`EventStore`](crate::store::EventStore).

mod event;
mod pipeline;
mod result;

pub use event::{now_ms, DetectionEvent, DetectionRecord};
pub use pipeline::{ConfidenceFilter, DetectionPipeline, DEFAULT_CONFIDENCE_THRESHOLD};
pub use result::RawDetection;
