//! Match-stat data model
//!
//! Provides the typed view of one player performance sample and the
//! labelled training set built from many of them:
//! - [`FeatureVector`]: the 8 match stats in training order
//! - [`Label`]: pro / not-pro
//! - [`Dataset`]: ordered training examples plus the feature order they use
//! - Game-specific bounds used for out-of-range warnings

pub mod loader;

pub use loader::load_csv;

use crate::error::{Result, ScoutError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Number of model features
pub const N_FEATURES: usize = 8;

/// Feature column names, in the order the scaler and classifier consume them
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "Kills",
    "Damage",
    "Boosts",
    "Heals",
    "Distance",
    "Weapons",
    "Revives",
    "Headshots",
];

/// Label column name in training CSVs
pub const TARGET_COLUMN: &str = "is_pro";

/// Inclusive (min, max) bounds per feature, aligned with [`FEATURE_NAMES`]
pub const FEATURE_BOUNDS: [(f64, f64); N_FEATURES] = [
    (0.0, 100.0),
    (0.0, 10_000.0),
    (0.0, 30.0),
    (0.0, 30.0),
    (0.0, 15_000.0),
    (0.0, 50.0),
    (0.0, 15.0),
    (0.0, 50.0),
];

/// Binary classification target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    NotPro = 0,
    Pro = 1,
}

impl Label {
    /// Probability at or above which a sample is labelled [`Label::Pro`]
    pub const DECISION_THRESHOLD: f64 = 0.5;

    /// Parse a numeric label; only exact 0 and 1 are accepted
    pub fn from_value(value: f64) -> Result<Self> {
        if value == 0.0 {
            Ok(Label::NotPro)
        } else if value == 1.0 {
            Ok(Label::Pro)
        } else {
            Err(ScoutError::DatasetError(format!(
                "label must be 0 or 1, got {}",
                value
            )))
        }
    }

    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::DECISION_THRESHOLD {
            Label::Pro
        } else {
            Label::NotPro
        }
    }

    pub fn as_f64(self) -> f64 {
        self as u8 as f64
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A feature value outside its game-specific bounds.
///
/// Non-fatal: the value is used as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeWarning {
    pub feature: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} = {} is outside the expected range [{}, {}]",
            self.feature, self.value, self.min, self.max
        )
    }
}

/// One player performance sample.
///
/// JSON field names are lower-case; the CSV-style capitalised names are
/// accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(alias = "Kills")]
    pub kills: f64,
    #[serde(alias = "Damage")]
    pub damage: f64,
    #[serde(alias = "Boosts")]
    pub boosts: f64,
    #[serde(alias = "Heals")]
    pub heals: f64,
    #[serde(alias = "Distance")]
    pub distance: f64,
    #[serde(alias = "Weapons")]
    pub weapons: f64,
    #[serde(alias = "Revives")]
    pub revives: f64,
    #[serde(alias = "Headshots")]
    pub headshots: f64,
}

impl Default for FeatureVector {
    /// The pre-filled values of the scouting form
    fn default() -> Self {
        Self {
            kills: 5.0,
            damage: 450.0,
            boosts: 2.0,
            heals: 2.0,
            distance: 1200.0,
            weapons: 4.0,
            revives: 1.0,
            headshots: 1.0,
        }
    }
}

impl FeatureVector {
    pub fn zeros() -> Self {
        Self::from_array([0.0; N_FEATURES])
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.kills,
            self.damage,
            self.boosts,
            self.heals,
            self.distance,
            self.weapons,
            self.revives,
            self.headshots,
        ]
    }

    pub fn from_array(values: [f64; N_FEATURES]) -> Self {
        let [kills, damage, boosts, heals, distance, weapons, revives, headshots] = values;
        Self {
            kills,
            damage,
            boosts,
            heals,
            distance,
            weapons,
            revives,
            headshots,
        }
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; N_FEATURES] = values.try_into().map_err(|_| ScoutError::ShapeError {
            expected: format!("{} features", N_FEATURES),
            actual: format!("{} features", values.len()),
        })?;
        Ok(Self::from_array(array))
    }

    /// Reject NaN and infinite values
    pub fn validate_finite(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(ScoutError::InvalidInput(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Features outside [`FEATURE_BOUNDS`]
    pub fn range_warnings(&self) -> Vec<RangeWarning> {
        FEATURE_NAMES
            .iter()
            .zip(FEATURE_BOUNDS)
            .zip(self.to_array())
            .filter(|((_, (min, max)), value)| value < min || value > max)
            .map(|((name, (min, max)), value)| RangeWarning {
                feature: name.to_string(),
                value,
                min,
                max,
            })
            .collect()
    }
}

/// A feature vector with its known label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(features: FeatureVector, label: Label) -> Self {
        Self { features, label }
    }
}

/// Ordered labelled examples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    examples: Vec<TrainingExample>,
}

impl Dataset {
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    pub fn push(&mut self, example: TrainingExample) {
        self.examples.push(example);
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Feature order of every example in this dataset
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// (not-pro count, pro count)
    pub fn class_counts(&self) -> (usize, usize) {
        let pros = self
            .examples
            .iter()
            .filter(|e| e.label == Label::Pro)
            .count();
        (self.examples.len() - pros, pros)
    }

    /// Feature matrix (n × 8) and label vector (n)
    pub fn to_arrays(&self) -> (Array2<f64>, Array1<f64>) {
        let n = self.examples.len();
        let mut x = Array2::zeros((n, N_FEATURES));
        let mut y = Array1::zeros(n);

        for (i, example) in self.examples.iter().enumerate() {
            for (j, value) in example.features.to_array().into_iter().enumerate() {
                x[[i, j]] = value;
            }
            y[i] = example.label.as_f64();
        }

        (x, y)
    }
}

impl FromIterator<TrainingExample> for Dataset {
    fn from_iter<I: IntoIterator<Item = TrainingExample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
