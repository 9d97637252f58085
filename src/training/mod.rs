//! Model training module
//!
//! Fits the two halves of a scouting model from a labelled [`Dataset`](crate::data::Dataset):
//! - [`StandardScaler`](crate::preprocessing::StandardScaler) over the 8 match stats
//! - [`LogisticRegression`] over the scaled stats (Newton or gradient descent)

mod config;
mod engine;
pub mod linear_models;
pub mod metrics;

pub use config::{Solver, TrainingConfig};
pub use engine::{train, TrainedArtifacts};
pub use linear_models::{sigmoid, FitReport, LogisticRegression};
pub use metrics::ModelMetrics;
