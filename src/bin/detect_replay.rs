//! detect_replay - run recorded detector output through the severity pipeline
//!
//! Reads one JSON detection per line:
//! `{"frame_id": 3, "timestamp_ms": 1700000000000, "confidence": 0.8,
//!   "bbox": [x1, y1, x2, y2], "frame_dimensions": [height, width]}`
//! Consecutive lines with the same `frame_id` form one frame. The dashboard
//! snapshot is printed to stdout; the summary is logged and optionally
//! written as a markdown report.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use roadguard::config::RoadguardConfig;
use roadguard::detect::{now_ms, ConfidenceFilter, DetectionPipeline, RawDetection};
use roadguard::report::{render_markdown, summarize_with, RenderOptions, SummaryOptions};
use roadguard::severity::SeverityThresholds;
use roadguard::store::EventStore;

#[path = "../ui.rs"]
mod ui;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// low_max 0.02, medium_max 0.05
    Dashboard,
    /// low_max 0.01, medium_max 0.05
    Detector,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON-lines detections file, or `-` for stdin.
    #[arg(long, default_value = "-")]
    input: String,
    /// Override the configured confidence cutoff.
    #[arg(long)]
    confidence_threshold: Option<f64>,
    /// Use a named severity threshold preset instead of the configured one.
    #[arg(long, value_enum)]
    preset: Option<Preset>,
    /// Number of recent detections included in the snapshot.
    #[arg(long)]
    window: Option<usize>,
    /// Also write the summary as a markdown report.
    #[arg(long)]
    report_out: Option<PathBuf>,
    /// UI mode for stderr progress.
    #[arg(long, value_enum, default_value_t = ui::UiMode::Auto)]
    ui: ui::UiMode,
}

#[derive(Debug, Deserialize)]
struct ReplayLine {
    frame_id: u64,
    timestamp_ms: Option<u64>,
    #[serde(flatten)]
    detection: RawDetection,
}

fn main() -> Result<()> {
    roadguard::log::init();
    let args = Args::parse();
    let ui = ui::Ui::detect(args.ui);

    let cfg = RoadguardConfig::load()?;
    let filter = match args.confidence_threshold {
        Some(threshold) => ConfidenceFilter::new(threshold)?,
        None => cfg.confidence,
    };
    let thresholds = match args.preset {
        Some(Preset::Dashboard) => SeverityThresholds::dashboard(),
        Some(Preset::Detector) => SeverityThresholds::detector(),
        None => cfg.severity,
    };
    let window = args.window.unwrap_or(cfg.store.recent_window);

    let store = Arc::new(EventStore::new(cfg.store.capacity)?);
    let pipeline = DetectionPipeline::new(thresholds, filter, store.clone());
    log::info!(
        "replaying with confidence > {}, low_max={}, medium_max={}, capacity={}",
        filter.threshold(),
        thresholds.low_max(),
        thresholds.medium_max(),
        store.capacity()
    );

    let frames = {
        let _stage = ui.stage("Read detections");
        read_frames(&args.input)?
    };

    let mut rejected_frames = 0usize;
    {
        let _stage = ui.stage("Classify detections");
        for frame in &frames {
            if let Err(e) = pipeline.ingest(frame.frame_id, &frame.detections, frame.timestamp_ms) {
                log::warn!("frame {} rejected: {}", frame.frame_id, e);
                rejected_frames += 1;
            }
        }
    }

    let events = store.recent(store.capacity());
    let summary = summarize_with(
        &events,
        &SummaryOptions {
            high_confidence_cutoff: cfg.report.high_confidence_cutoff,
        },
    );
    log::info!(
        "frames={} rejected={} retained={} retained_frames={} fps={:.2} high={} medium={} low={} avg_conf={:.2} accuracy={:.2}%",
        frames.len(),
        rejected_frames,
        summary.total,
        summary.frames,
        summary.fps.unwrap_or(0.0),
        summary.counts.high,
        summary.counts.medium,
        summary.counts.low,
        summary.average_confidence,
        summary.accuracy_percent()
    );

    if let Some(path) = &args.report_out {
        let _stage = ui.stage("Write summary report");
        let options = RenderOptions {
            title: "RoadGuard AI - Detection Summary".to_string(),
            ..RenderOptions::default()
        };
        let markdown = render_markdown(&summary.to_report_data(), &options)?;
        std::fs::write(path, markdown)
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;
    }

    let snapshot = store.snapshot(window);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

struct ReplayFrame {
    frame_id: u64,
    timestamp_ms: u64,
    detections: Vec<RawDetection>,
}

fn read_frames(input: &str) -> Result<Vec<ReplayFrame>> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(input)
            .map_err(|e| anyhow!("failed to open detections file {}: {}", input, e))?;
        Box::new(BufReader::new(file))
    };

    let mut frames: Vec<ReplayFrame> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(&line)
            .map_err(|e| anyhow!("line {}: invalid detection record: {}", idx + 1, e))?;
        if let Some(frame) = frames.last_mut().filter(|f| f.frame_id == parsed.frame_id) {
            frame.detections.push(parsed.detection);
            continue;
        }
        frames.push(ReplayFrame {
            frame_id: parsed.frame_id,
            timestamp_ms: parsed.timestamp_ms.unwrap_or_else(now_ms),
            detections: vec![parsed.detection],
        });
    }
    Ok(frames)
}
