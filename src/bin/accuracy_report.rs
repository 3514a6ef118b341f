//! accuracy_report - write the markdown accuracy report and its JSON metrics

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use roadguard::config::RoadguardConfig;
use roadguard::report::{
    render_json, render_markdown, sample_accuracy_data, BandThresholds, RenderOptions, ReportData,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Metrics JSON object to report on (defaults to the bundled sample figures).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output path for the markdown report.
    #[arg(long, default_value = "accuracy_report.md")]
    markdown_out: PathBuf,
    /// Output path for the JSON metrics document.
    #[arg(long, default_value = "accuracy_data.json")]
    json_out: PathBuf,
    /// Report title.
    #[arg(long, default_value = "RoadGuard AI - Accuracy Report")]
    title: String,
    /// Lower bound of the Excellent band (overrides config).
    #[arg(long)]
    excellent: Option<f64>,
    /// Lower bound of the Good band (overrides config).
    #[arg(long)]
    good: Option<f64>,
    /// Skip the accuracy breakdown section.
    #[arg(long)]
    no_breakdown: bool,
    /// UI mode for stderr progress.
    #[arg(long, value_enum, default_value_t = ui::UiMode::Auto)]
    ui: ui::UiMode,
}

fn main() -> Result<()> {
    roadguard::log::init();
    let args = Args::parse();
    let ui = ui::Ui::detect(args.ui);

    let cfg = RoadguardConfig::load()?;
    let bands = BandThresholds::new(
        args.excellent.unwrap_or(cfg.report.bands.excellent()),
        args.good.unwrap_or(cfg.report.bands.good()),
    )?;

    let data = {
        let _stage = ui.stage("Load metrics");
        match &args.input {
            Some(path) => read_metrics(path)?,
            None => {
                log::info!("no --input given; using bundled sample figures");
                sample_accuracy_data()
            }
        }
    };

    let options = RenderOptions {
        title: args.title,
        generated: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        bands: (!args.no_breakdown).then_some(bands),
        ..RenderOptions::default()
    };

    let markdown = {
        let _stage = ui.stage("Render report");
        render_markdown(&data, &options)?
    };
    let json = render_json(&data)?;

    {
        let _stage = ui.stage("Write artifacts");
        std::fs::write(&args.markdown_out, markdown).map_err(|e| {
            anyhow!("failed to write {}: {}", args.markdown_out.display(), e)
        })?;
        std::fs::write(&args.json_out, json)
            .map_err(|e| anyhow!("failed to write {}: {}", args.json_out.display(), e))?;
    }

    println!("accuracy report written to {}", args.markdown_out.display());
    println!("metrics written to {}", args.json_out.display());
    Ok(())
}

fn read_metrics(path: &Path) -> Result<ReportData> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read metrics file {}: {}", path.display(), e))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow!("metrics file {} must hold a JSON object: {}", path.display(), e))
}
