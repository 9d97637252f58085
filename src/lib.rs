//! PUBG Scout - pro-player classification from match stats
//!
//! Trains a standard scaler plus L2-regularised logistic regression on
//! labelled match statistics, persists the pair as bound binary artifacts,
//! and serves predictions from the command line or a small web service.
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Feature vectors, labels, datasets and CSV loading
//! - [`preprocessing`] - Standard (z-score) scaling
//! - [`training`] - Logistic regression and the training engine
//! - [`inference`] - Pure prediction and the shared [`Predictor`](inference::Predictor)
//! - [`export`] - Paired artifact persistence
//! - [`report`] - Verdict text and display-only performance scores
//!
//! ## Services
//! - [`server`] - HTTP server with the scouting form and a JSON API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod export;
pub mod report;

// Services
pub mod server;
pub mod cli;

pub use error::{Result, ScoutError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, ScoutError};

    // Data
    pub use crate::data::{load_csv, Dataset, FeatureVector, Label, RangeWarning, TrainingExample, FEATURE_NAMES};

    // Preprocessing
    pub use crate::preprocessing::StandardScaler;

    // Training
    pub use crate::training::{train, FitReport, LogisticRegression, ModelMetrics, Solver, TrainedArtifacts, TrainingConfig};

    // Inference
    pub use crate::inference::{predict, Prediction, Predictor};

    // Export
    pub use crate::export::{ArtifactPair, ArtifactStore};

    // Report
    pub use crate::report::{PerformanceScores, ScoutReport};
}
