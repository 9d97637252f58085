//! Inference engine module
//!
//! Turns one [`FeatureVector`](crate::data::FeatureVector) into a pro /
//! not-pro [`Prediction`] using a loaded scaler / classifier pair.

mod engine;

pub use engine::{predict, ModelInfo, Prediction, Predictor};
