use thiserror::Error;

/// Failures raised by the classification and reporting core.
///
/// None of these are retried: nothing in the core performs I/O, so every
/// error describes bad input or bad configuration and is surfaced as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoadguardError {
    /// Frame area is not positive, or a box has a negative/non-finite side.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Threshold or capacity values violating their required ordering.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A report value has no textual or structural representation.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Detector output outside the accepted value ranges.
    #[error("invalid detection: {0}")]
    InvalidDetection(String),
}

pub type Result<T> = std::result::Result<T, RoadguardError>;

impl RoadguardError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::InvalidDetection(msg.into())
    }
}

impl From<serde_json::Error> for RoadguardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
