use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, RoadguardError};

/// Named bucket used to group metrics by value in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Band {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Excellent => "Excellent",
            Band::Good => "Good",
            Band::NeedsImprovement => "Needs improvement",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cut points for [`classify_into_bands`]. `good` must be below `excellent`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BandThresholds {
    excellent: f64,
    good: f64,
}

impl BandThresholds {
    pub fn new(excellent: f64, good: f64) -> Result<Self> {
        if !(excellent.is_finite() && good.is_finite()) {
            return Err(RoadguardError::config("band thresholds must be finite"));
        }
        if good >= excellent {
            return Err(RoadguardError::config(format!(
                "band thresholds must satisfy good < excellent (good={good}, excellent={excellent})"
            )));
        }
        Ok(Self { excellent, good })
    }

    pub fn excellent(&self) -> f64 {
        self.excellent
    }

    pub fn good(&self) -> f64 {
        self.good
    }

    /// Values on a cut point belong to the higher band.
    pub fn band_for(&self, value: f64) -> Band {
        if value >= self.excellent {
            Band::Excellent
        } else if value >= self.good {
            Band::Good
        } else {
            Band::NeedsImprovement
        }
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            excellent: 90.0,
            good: 85.0,
        }
    }
}

/// Group metrics by band. Each item travels with its value, so metrics that
/// share a display name stay distinct. Items keep their input order within a
/// band; bands with no members are absent from the result.
pub fn classify_into_bands<I, T>(metrics: I, thresholds: &BandThresholds) -> BTreeMap<Band, Vec<T>>
where
    I: IntoIterator<Item = (T, f64)>,
{
    let mut bands: BTreeMap<Band, Vec<T>> = BTreeMap::new();
    for (item, value) in metrics {
        bands
            .entry(thresholds.band_for(value))
            .or_default()
            .push(item);
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_source_accuracy_figures() {
        let metrics = vec![
            ("Precision", 91.8),
            ("Recall", 95.7),
            ("Detection Accuracy", 87.5),
            ("Low Severity", 92.1),
            ("High Severity", 84.9),
            ("Medium Severity", 88.4),
        ];
        let bands = classify_into_bands(metrics, &BandThresholds::default());
        assert_eq!(
            bands[&Band::Excellent],
            vec!["Precision", "Recall", "Low Severity"]
        );
        assert_eq!(
            bands[&Band::Good],
            vec!["Detection Accuracy", "Medium Severity"]
        );
        assert_eq!(bands[&Band::NeedsImprovement], vec!["High Severity"]);
    }

    #[test]
    fn same_name_with_different_values_lands_in_each_band() {
        let metrics = vec![(("Precision", 95.0), 95.0), (("Precision", 70.0), 70.0)];
        let bands = classify_into_bands(metrics, &BandThresholds::default());
        assert_eq!(bands[&Band::Excellent], vec![("Precision", 95.0)]);
        assert_eq!(bands[&Band::NeedsImprovement], vec![("Precision", 70.0)]);
        assert!(!bands.contains_key(&Band::Good));
    }

    #[test]
    fn boundaries_go_to_higher_band() {
        let thresholds = BandThresholds::new(0.9, 0.5).unwrap();
        assert_eq!(thresholds.band_for(0.9), Band::Excellent);
        assert_eq!(thresholds.band_for(0.5), Band::Good);
        assert_eq!(thresholds.band_for(0.4999), Band::NeedsImprovement);
    }

    #[test]
    fn empty_bands_are_absent() {
        let bands = classify_into_bands(vec![("fps", 24.5)], &BandThresholds::default());
        assert_eq!(bands.len(), 1);
        assert!(!bands.contains_key(&Band::Excellent));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        assert!(BandThresholds::new(85.0, 90.0).is_err());
        assert!(BandThresholds::new(90.0, 90.0).is_err());
        assert!(BandThresholds::new(f64::INFINITY, 1.0).is_err());
    }
}
