use ndarray_stats::errors::MultiInputError;
use thiserror::Error;

/// Errors produced while loading a dataset, building matrices or clustering.
#[derive(Debug, Error)]
pub enum ForelError {
    /// Invalid feature selection, radius, or configuration file contents.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The dataset is too small for the requested computation.
    #[error("Insufficient data: need at least {required} records, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A field value could not be converted to a number (strict parsing only).
    #[error("Malformed record {row}: field `{field}` has non-numeric value {value:?}")]
    MalformedRecord {
        row: usize,
        field: String,
        value: String,
    },

    /// No unclustered record lies within the radius of the current center.
    #[error("Empty neighbourhood around record {center} at radius {radius}")]
    EmptyNeighbourhood { center: usize, radius: f64 },

    #[error("Feature vector mismatch: {0}")]
    Dimension(#[from] MultiInputError),

    #[error("Radius sweep cancelled after {completed} trials")]
    Cancelled { completed: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type ForelResult<T> = Result<T, ForelError>;
