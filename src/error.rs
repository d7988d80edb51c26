//! Error types for projection runs and configuration loading

use thiserror::Error;

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors raised by the projection engine and its loaders.
///
/// Configuration-shape problems (unknown scenario, category, bucket) are
/// errors because they indicate a caller bug. Numeric edge cases such as zero
/// revenue or a non-convergent IRR are absorbed with documented fallbacks and
/// never show up here.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Scenario name that is not one of the fixed set.
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Scenario is valid but the category has no utilization for it.
    #[error("unknown scenario '{scenario}' for category '{category}': no utilization configured")]
    UtilizationNotConfigured {
        /// Category key.
        category: String,
        /// Scenario name.
        scenario: String,
    },

    /// Scenario has no parameter set in the assumptions.
    #[error("unknown scenario '{0}': no scenario parameters configured")]
    ScenarioNotConfigured(String),

    /// Fleet or portfolio references a category the division does not define.
    #[error("unknown category '{category}' in division '{division}'")]
    UnknownCategory {
        /// Division name.
        division: String,
        /// Category key.
        category: String,
    },

    /// Cost override names a bucket that is not configured.
    #[error("unknown cost bucket '{bucket}' in division '{division}'")]
    UnknownCostBucket {
        /// Division name.
        division: String,
        /// Bucket name.
        bucket: String,
    },

    /// Division lookup by name failed.
    #[error("unknown division '{0}'")]
    UnknownDivision(String),

    /// Projection years are empty, out of order or not contiguous.
    #[error("invalid projection years: {0}")]
    InvalidYears(String),

    /// Any other structural problem with loaded configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectionError {
    /// Creates a new invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
