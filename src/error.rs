//! Error types for the scout pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Main error type for training, persistence and prediction.
///
/// Convergence problems and out-of-range inputs are not errors: they are
/// logged as warnings and reported alongside the result.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Training data is unreadable, has missing or malformed columns, or
    /// does not contain enough examples of each label.
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// A persisted artifact is missing, unreadable or corrupt.
    #[error("Artifact not found: {path}: {reason}")]
    ArtifactNotFound { path: PathBuf, reason: String },

    /// Scaler and classifier do not belong together.
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScoutError {
    pub(crate) fn artifact_not_found(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ScoutError::ArtifactNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for ScoutError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ScoutError::DatasetError(err.to_string())
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for ScoutError {
    fn from(err: bincode::Error) -> Self {
        ScoutError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScoutError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScoutError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
