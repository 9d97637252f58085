//! Inference engine implementation
//!
//! Prediction is a pure function of a feature vector and a loaded pair.
//! [`Predictor`] holds one pair for the life of the process:
//! - Loaded and verified once at startup
//! - Shared read-only behind an `Arc`, so clones are cheap and need no locking
//! - Counts served predictions with an atomic

use crate::data::{FeatureVector, Label, RangeWarning, N_FEATURES};
use crate::error::{Result, ScoutError};
use crate::export::{check_compatible, ArtifactMetadata, ArtifactPair, ArtifactStore};
use crate::preprocessing::StandardScaler;
use crate::training::{sigmoid, FitReport, LogisticRegression, ModelMetrics, TrainingConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Outcome of scoring one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// P(label = pro), in [0, 1]
    pub probability: f64,
    /// Inputs outside their expected bounds; the prediction still used them as given
    pub range_warnings: Vec<RangeWarning>,
}

/// Score one vector against a scaler / classifier pair.
///
/// Deterministic: identical inputs and artifacts always give the identical
/// probability.
pub fn predict(
    vector: &FeatureVector,
    scaler: &StandardScaler,
    classifier: &LogisticRegression,
) -> Result<Prediction> {
    check_compatible(scaler, classifier)?;
    if scaler.n_features() != N_FEATURES {
        return Err(ScoutError::ArtifactMismatch(format!(
            "artifacts expect {} features, a feature vector has {}",
            scaler.n_features(),
            N_FEATURES
        )));
    }
    vector.validate_finite()?;

    let range_warnings = vector.range_warnings();
    for warning in &range_warnings {
        warn!(
            feature = %warning.feature,
            value = warning.value,
            min = warning.min,
            max = warning.max,
            "InputRangeWarning: feature outside expected range"
        );
    }

    let scaled = scaler.transform_row(&vector.to_array())?;
    let probability = sigmoid(classifier.decision_row(scaled.view())?);

    Ok(Prediction {
        label: Label::from_probability(probability),
        probability,
        range_warnings,
    })
}

/// Description of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub pair_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub crate_version: String,
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub fit: FitReport,
    pub metrics: ModelMetrics,
    pub config: TrainingConfig,
}

/// Immutable handle on a loaded artifact pair
#[derive(Debug, Clone)]
pub struct Predictor {
    pair: Arc<ArtifactPair>,
    served: Arc<AtomicU64>,
}

impl Predictor {
    /// Load `scaler.bin` and `model.bin` from `dir`.
    ///
    /// Fails with no partial state if either file is missing, corrupt or
    /// does not belong with the other.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let pair = ArtifactStore::new(dir.as_ref()).load()?;
        Self::from_pair(pair)
    }

    pub fn from_pair(pair: ArtifactPair) -> Result<Self> {
        check_compatible(&pair.scaler, &pair.classifier)?;
        if pair.n_features() != N_FEATURES {
            return Err(ScoutError::ArtifactMismatch(format!(
                "artifacts have {} features, expected {}",
                pair.n_features(),
                N_FEATURES
            )));
        }

        Ok(Self {
            pair: Arc::new(pair),
            served: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction> {
        let prediction = predict(vector, &self.pair.scaler, &self.pair.classifier)?;
        self.served.fetch_add(1, Ordering::Relaxed);
        Ok(prediction)
    }

    /// Successful predictions across all clones of this handle
    pub fn predictions_served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.pair.metadata
    }

    pub fn pair(&self) -> &ArtifactPair {
        &self.pair
    }

    pub fn model_info(&self) -> ModelInfo {
        let pair = &self.pair;
        ModelInfo {
            pair_id: pair.metadata.pair_id,
            created_at: pair.metadata.created_at,
            crate_version: pair.metadata.crate_version.clone(),
            format_version: pair.metadata.format_version,
            feature_names: pair.metadata.feature_names.clone(),
            means: pair.scaler.means(),
            scales: pair.scaler.scales(),
            weights: pair
                .classifier
                .coefficients()
                .map(|w| w.to_vec())
                .unwrap_or_default(),
            bias: pair.classifier.intercept().unwrap_or(0.0),
            fit: pair.report,
            metrics: pair.metrics.clone(),
            config: pair.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, TrainingExample};
    use crate::training::{train, TrainingConfig};
    use ndarray::Array2;

    fn trained() -> (StandardScaler, LogisticRegression) {
        let dataset: Dataset = vec![
            TrainingExample::new(FeatureVector::zeros(), Label::NotPro),
            TrainingExample::new(FeatureVector::from_array([1.0, 50.0, 0.0, 1.0, 200.0, 1.0, 0.0, 0.0]), Label::NotPro),
            TrainingExample::new(FeatureVector::from_array([9.0, 800.0, 4.0, 3.0, 2400.0, 5.0, 2.0, 3.0]), Label::Pro),
            TrainingExample::new(FeatureVector::from_array([12.0, 1100.0, 5.0, 4.0, 3000.0, 6.0, 3.0, 4.0]), Label::Pro),
        ]
        .into_iter()
        .collect();
        let artifacts = train(&dataset, &TrainingConfig::default()).unwrap();
        (artifacts.scaler, artifacts.classifier)
    }

    #[test]
    fn test_label_follows_threshold() {
        let (scaler, classifier) = trained();
        let low = predict(&FeatureVector::zeros(), &scaler, &classifier).unwrap();
        let high = predict(
            &FeatureVector::from_array([12.0, 1100.0, 5.0, 4.0, 3000.0, 6.0, 3.0, 4.0]),
            &scaler,
            &classifier,
        )
        .unwrap();

        for p in [&low, &high] {
            assert!((0.0..=1.0).contains(&p.probability));
            assert_eq!(p.label == Label::Pro, p.probability >= 0.5);
        }
        assert_eq!(low.label, Label::NotPro);
        assert_eq!(high.label, Label::Pro);
    }

    #[test]
    fn test_out_of_range_is_warned_not_clamped() {
        let (scaler, classifier) = trained();
        let mut v = FeatureVector::zeros();
        v.kills = 150.0;
        let p = predict(&v, &scaler, &classifier).unwrap();
        assert_eq!(p.range_warnings.len(), 1);
        assert_eq!(p.range_warnings[0].value, 150.0);

        let mut clamped = v;
        clamped.kills = 100.0;
        let q = predict(&clamped, &scaler, &classifier).unwrap();
        assert_ne!(p.probability, q.probability);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let (scaler, classifier) = trained();
        let mut v = FeatureVector::default();
        v.distance = f64::INFINITY;
        assert!(matches!(
            predict(&v, &scaler, &classifier),
            Err(ScoutError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let (_, classifier) = trained();
        let names: Vec<String> = (0..3).map(|i| format!("f{}", i)).collect();
        let mut narrow = StandardScaler::new();
        narrow.fit(&Array2::from_elem((2, 3), 1.0), &names).unwrap();

        assert!(matches!(
            predict(&FeatureVector::default(), &narrow, &classifier),
            Err(ScoutError::ArtifactMismatch(_))
        ));
    }
}
