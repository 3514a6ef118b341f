use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::detect::{ConfidenceFilter, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::report::{BandThresholds, DEFAULT_HIGH_CONFIDENCE_CUTOFF};
use crate::severity::SeverityThresholds;
use crate::store::{DEFAULT_CAPACITY, DEFAULT_RECENT_WINDOW};

const DEFAULT_LOW_MAX: f64 = 0.01;
const DEFAULT_MEDIUM_MAX: f64 = 0.05;
const DEFAULT_BAND_EXCELLENT: f64 = 90.0;
const DEFAULT_BAND_GOOD: f64 = 85.0;

#[derive(Debug, Deserialize, Default)]
struct RoadguardConfigFile {
    confidence_threshold: Option<f64>,
    severity: Option<SeverityConfigFile>,
    store: Option<StoreConfigFile>,
    report: Option<ReportConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SeverityConfigFile {
    low_max: Option<f64>,
    medium_max: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct StoreConfigFile {
    capacity: Option<usize>,
    recent_window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ReportConfigFile {
    excellent: Option<f64>,
    good: Option<f64>,
    high_confidence_cutoff: Option<f64>,
}

/// Validated runtime configuration.
///
/// Raw numbers are checked by constructing the typed values they feed, so an
/// invalid threshold fails at load time rather than on the first detection.
#[derive(Debug, Clone)]
pub struct RoadguardConfig {
    pub confidence: ConfidenceFilter,
    pub severity: SeverityThresholds,
    pub store: StoreSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub capacity: usize,
    pub recent_window: usize,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub bands: BandThresholds,
    pub high_confidence_cutoff: f64,
}

/// Unvalidated values collected from file and environment.
#[derive(Debug, Clone)]
struct RawConfig {
    confidence_threshold: f64,
    low_max: f64,
    medium_max: f64,
    capacity: usize,
    recent_window: usize,
    excellent: f64,
    good: f64,
    high_confidence_cutoff: f64,
}

impl RoadguardConfig {
    /// Load from `$ROADGUARD_CONFIG` (if set), then apply `ROADGUARD_*` overrides.
    pub fn load() -> Result<Self> {
        let file_cfg = match std::env::var("ROADGUARD_CONFIG").ok().as_deref() {
            Some(path) if !path.trim().is_empty() => read_config_file(Path::new(path))?,
            _ => RoadguardConfigFile::default(),
        };
        let mut raw = RawConfig::from_file(file_cfg);
        raw.apply_env()?;
        raw.validate()
    }

    /// Load from an explicit file, still honouring environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut raw = RawConfig::from_file(read_config_file(path)?);
        raw.apply_env()?;
        raw.validate()
    }
}

impl Default for RoadguardConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceFilter::default(),
            severity: SeverityThresholds::detector(),
            store: StoreSettings {
                capacity: DEFAULT_CAPACITY,
                recent_window: DEFAULT_RECENT_WINDOW,
            },
            report: ReportSettings {
                bands: BandThresholds::default(),
                high_confidence_cutoff: DEFAULT_HIGH_CONFIDENCE_CUTOFF,
            },
        }
    }
}

impl RawConfig {
    fn from_file(file: RoadguardConfigFile) -> Self {
        let severity = file.severity.unwrap_or_default();
        let store = file.store.unwrap_or_default();
        let report = file.report.unwrap_or_default();
        Self {
            confidence_threshold: file
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            low_max: severity.low_max.unwrap_or(DEFAULT_LOW_MAX),
            medium_max: severity.medium_max.unwrap_or(DEFAULT_MEDIUM_MAX),
            capacity: store.capacity.unwrap_or(DEFAULT_CAPACITY),
            recent_window: store.recent_window.unwrap_or(DEFAULT_RECENT_WINDOW),
            excellent: report.excellent.unwrap_or(DEFAULT_BAND_EXCELLENT),
            good: report.good.unwrap_or(DEFAULT_BAND_GOOD),
            high_confidence_cutoff: report
                .high_confidence_cutoff
                .unwrap_or(DEFAULT_HIGH_CONFIDENCE_CUTOFF),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_parse("ROADGUARD_CONFIDENCE_THRESHOLD")? {
            self.confidence_threshold = v;
        }
        if let Some(v) = env_parse("ROADGUARD_LOW_MAX")? {
            self.low_max = v;
        }
        if let Some(v) = env_parse("ROADGUARD_MEDIUM_MAX")? {
            self.medium_max = v;
        }
        if let Some(v) = env_parse("ROADGUARD_STORE_CAPACITY")? {
            self.capacity = v;
        }
        if let Some(v) = env_parse("ROADGUARD_RECENT_WINDOW")? {
            self.recent_window = v;
        }
        if let Some(v) = env_parse("ROADGUARD_BAND_EXCELLENT")? {
            self.excellent = v;
        }
        if let Some(v) = env_parse("ROADGUARD_BAND_GOOD")? {
            self.good = v;
        }
        Ok(())
    }

    fn validate(self) -> Result<RoadguardConfig> {
        let confidence = ConfidenceFilter::new(self.confidence_threshold)?;
        let severity = SeverityThresholds::new(self.low_max, self.medium_max)?;
        let bands = BandThresholds::new(self.excellent, self.good)?;
        if self.capacity == 0 {
            return Err(anyhow!("store capacity must be greater than zero"));
        }
        if self.recent_window == 0 {
            return Err(anyhow!("recent window must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.high_confidence_cutoff) {
            return Err(anyhow!(
                "high confidence cutoff must be in [0, 1] (got {})",
                self.high_confidence_cutoff
            ));
        }
        Ok(RoadguardConfig {
            confidence,
            severity,
            store: StoreSettings {
                capacity: self.capacity,
                recent_window: self.recent_window,
            },
            report: ReportSettings {
                bands,
                high_confidence_cutoff: self.high_confidence_cutoff,
            },
        })
    }
}

fn read_config_file(path: &Path) -> Result<RoadguardConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} has an invalid value: {}", key, value)),
        _ => Ok(None),
    }
}
