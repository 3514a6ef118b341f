use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Result, RoadguardError};

use super::bands::{classify_into_bands, Band, BandThresholds};

/// Ordered mapping from metric (or section) name to value.
///
/// Top-level objects are sections; every other top-level value is an
/// overview metric. Key order is the order the caller inserted them.
pub type ReportData = Map<String, Value>;

const OVERVIEW_HEADING: &str = "Overview";
const BREAKDOWN_HEADING: &str = "Accuracy Breakdown";

/// Display name and unit suffix for a metric key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricLabel {
    pub label: String,
    pub unit: String,
}

/// Human-readable names for metric and section keys.
///
/// Keys without an entry are title-cased (`road_types` -> `Road Types`) and
/// rendered without a unit.
#[derive(Clone, Debug, Default)]
pub struct LabelBook {
    metrics: HashMap<String, MetricLabel>,
    sections: HashMap<String, String>,
}

impl LabelBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Labels for the accuracy report's metric names.
    pub fn accuracy() -> Self {
        let mut book = Self::default();
        book.section("model_performance", "Detection Performance")
            .section("severity_classification", "Severity Classification Accuracy");
        for (key, label, unit) in [
            ("detection_accuracy", "Detection Accuracy", "%"),
            ("false_positive_rate", "False Positives", "%"),
            ("false_negative_rate", "False Negatives", "%"),
            ("precision", "Precision", "%"),
            ("recall", "Recall", "%"),
            ("f1_score", "F1-Score", "%"),
            ("low_accuracy", "Low Severity", "%"),
            ("medium_accuracy", "Medium Severity", "%"),
            ("high_accuracy", "High Severity", "%"),
            ("overall_classification", "Overall Classification", "%"),
            ("avg_fps", "Average FPS", ""),
            ("avg_processing_time", "Processing Time", "s per frame"),
            ("total_frames", "Total Frames Processed", ""),
            ("lighting", "Lighting Conditions", ""),
            ("accuracy", "Accuracy", "%"),
            ("avg_confidence", "Average Confidence", "%"),
            ("processing_time", "Processing Time", "s"),
            ("detection_rate", "Detection Rate", " per second"),
        ] {
            book.metric(key, label, unit);
        }
        book
    }

    pub fn metric(&mut self, key: &str, label: &str, unit: &str) -> &mut Self {
        self.metrics.insert(
            key.to_string(),
            MetricLabel {
                label: label.to_string(),
                unit: unit.to_string(),
            },
        );
        self
    }

    pub fn section(&mut self, key: &str, title: &str) -> &mut Self {
        self.sections.insert(key.to_string(), title.to_string());
        self
    }

    pub fn metric_label(&self, key: &str) -> MetricLabel {
        self.metrics.get(key).cloned().unwrap_or_else(|| MetricLabel {
            label: title_case(key),
            unit: String::new(),
        })
    }

    pub fn section_title(&self, key: &str) -> String {
        self.sections
            .get(key)
            .cloned()
            .unwrap_or_else(|| title_case(key))
    }
}

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub title: String,
    /// Rendered verbatim under the title when present.
    pub generated: Option<String>,
    pub labels: LabelBook,
    /// Adds a breakdown of percentage metrics by band.
    pub bands: Option<BandThresholds>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "RoadGuard AI - Accuracy Report".to_string(),
            generated: None,
            labels: LabelBook::accuracy(),
            bands: None,
        }
    }
}

/// Render a metrics mapping as sectioned markdown.
///
/// Only keys present in `data` are rendered. Output is a pure function of the
/// inputs. Values with no textual form (`null`, nested sections, arrays of
/// non-scalars) fail with [`RoadguardError::Serialization`].
pub fn render_markdown(data: &ReportData, options: &RenderOptions) -> Result<String> {
    validate(data)?;

    let mut out = String::new();
    let _ = writeln!(out, "# {}", options.title);
    if let Some(generated) = &options.generated {
        let _ = writeln!(out, "Generated: {generated}");
    }

    let overview: Vec<(&String, &Value)> = data
        .iter()
        .filter(|(_, value)| !value.is_object())
        .collect();
    if !overview.is_empty() {
        let _ = writeln!(out, "\n## {OVERVIEW_HEADING}\n");
        for (key, value) in overview {
            write_metric(&mut out, &options.labels, key, value);
        }
    }

    for (key, value) in data {
        let Value::Object(section) = value else {
            continue;
        };
        if section.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n## {}\n", options.labels.section_title(key));
        for (metric, value) in section {
            write_metric(&mut out, &options.labels, metric, value);
        }
    }

    if let Some(thresholds) = &options.bands {
        let entries = percent_entries(data, &options.labels);
        let bands = classify_into_bands(
            entries.iter().map(|entry| (entry, entry.value)),
            thresholds,
        );
        if !bands.is_empty() {
            let _ = writeln!(out, "\n## {BREAKDOWN_HEADING}");
            for (band, members) in &bands {
                let _ = writeln!(out, "\n### {}:", band_heading(*band, thresholds));
                for entry in members {
                    let _ = writeln!(out, "- {}: {}%", entry.label, entry.text);
                }
            }
        }
    }

    Ok(out)
}

/// Pretty JSON with the input's key order. Parsing the output yields an equal map.
///
/// Any JSON value is accepted, including `null` and sections nested below the
/// first level; only the markdown view needs a text form per metric.
pub fn render_json(data: &ReportData) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(data)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Numeric leaves whose label carries a `%` unit, keyed by display label.
///
/// A label shared by metrics in different sections is qualified with the
/// section title, e.g. `Precision (Day)`.
pub fn percentage_metrics(data: &ReportData, labels: &LabelBook) -> Vec<(String, f64)> {
    percent_entries(data, labels)
        .into_iter()
        .map(|entry| (entry.label, entry.value))
        .collect()
}

/// One breakdown line: display label, the value as rendered in its section,
/// and the number used for banding.
struct PercentEntry {
    label: String,
    text: String,
    value: f64,
}

fn percent_entries(data: &ReportData, labels: &LabelBook) -> Vec<PercentEntry> {
    let mut found: Vec<(String, String, &Value)> = Vec::new();
    for (key, value) in data {
        match value {
            Value::Object(section) => {
                let title = labels.section_title(key);
                for (metric, value) in section {
                    found.push((title.clone(), metric.clone(), value));
                }
            }
            other => found.push((OVERVIEW_HEADING.to_string(), key.clone(), other)),
        }
    }

    let candidates: Vec<(String, String, f64, String)> = found
        .into_iter()
        .filter_map(|(section, key, value)| {
            let label = labels.metric_label(&key);
            if label.unit != "%" {
                return None;
            }
            let number = value.as_f64()?;
            let text = scalar_text(value)?;
            Some((section, label.label, number, text))
        })
        .collect();

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (_, label, _, _) in &candidates {
        *seen.entry(label.as_str()).or_default() += 1;
    }
    let shared: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(label, _)| label.to_string())
        .collect();

    candidates
        .into_iter()
        .map(|(section, label, value, text)| {
            let label = if shared.contains(&label) {
                format!("{label} ({section})")
            } else {
                label
            };
            PercentEntry { label, text, value }
        })
        .collect()
}

fn band_heading(band: Band, thresholds: &BandThresholds) -> String {
    match band {
        Band::Excellent => format!("{band} (>= {})", thresholds.excellent()),
        Band::Good => format!("{band} ({}-{})", thresholds.good(), thresholds.excellent()),
        Band::NeedsImprovement => format!("{band} (< {})", thresholds.good()),
    }
}

fn write_metric(out: &mut String, labels: &LabelBook, key: &str, value: &Value) {
    let label = labels.metric_label(key);
    // validate() has already rejected values without a text form
    let text = scalar_text(value).unwrap_or_default();
    let _ = writeln!(out, "- **{}**: {}{}", label.label, text, label.unit);
}

fn validate(data: &ReportData) -> Result<()> {
    for (key, value) in data {
        match value {
            Value::Object(section) => {
                for (metric, value) in section {
                    if scalar_text(value).is_none() {
                        return Err(unrenderable(&format!("{key}.{metric}"), value));
                    }
                }
            }
            other => {
                if scalar_text(other).is_none() {
                    return Err(unrenderable(key, other));
                }
            }
        }
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::Array(_) => None,
                    other => scalar_text(other),
                })
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn unrenderable(path: &str, value: &Value) -> RoadguardError {
    let kind = match value {
        Value::Null => "null",
        Value::Object(_) => "nested section",
        _ => "array of non-scalar values",
    };
    RoadguardError::serialization(format!("metric '{path}' has no text form ({kind})"))
}

fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
