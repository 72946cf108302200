//! Error types for the auto-datathon toolkit

use thiserror::Error;

/// Result type alias for auto-datathon operations
pub type Result<T> = std::result::Result<T, DatathonError>;

/// Main error type for the auto-datathon toolkit
#[derive(Error, Debug)]
pub enum DatathonError {
    #[error("Model name provided is invalid or inexistent parameters have been found: {0}")]
    ModelNameInexistent(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for DatathonError {
    fn from(err: polars::error::PolarsError) -> Self {
        DatathonError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for DatathonError {
    fn from(err: serde_json::Error) -> Self {
        DatathonError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DatathonError {
    fn from(err: ndarray::ShapeError) -> Self {
        DatathonError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
