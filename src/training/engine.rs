//! Training engine implementation

use super::config::TrainingConfig;
use super::linear_models::{FitReport, LogisticRegression};
use super::metrics::ModelMetrics;
use crate::data::{Dataset, FEATURE_NAMES};
use crate::error::{Result, ScoutError};
use crate::preprocessing::StandardScaler;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything a training run produces: the scaler/classifier pair plus how
/// the fit went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifacts {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
    pub report: FitReport,
    /// Metrics on the training set
    pub metrics: ModelMetrics,
    pub config: TrainingConfig,
}

impl TrainedArtifacts {
    pub fn feature_names(&self) -> &[String] {
        self.scaler.feature_names()
    }
}

/// Fit a scaler and a logistic regression on `dataset`.
///
/// The optimiser running out of iterations is logged as a convergence
/// warning and the partially fitted model is still returned.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainedArtifacts> {
    config.validate()?;

    let (not_pro, pro) = dataset.class_counts();
    if not_pro < config.min_class_count || pro < config.min_class_count {
        return Err(ScoutError::DatasetError(format!(
            "need at least {} examples of each label, found {} not-pro and {} pro",
            config.min_class_count, not_pro, pro
        )));
    }

    for (row, example) in dataset.examples().iter().enumerate() {
        if let Err(e) = example.features.validate_finite() {
            return Err(ScoutError::DatasetError(format!("row {}: {}", row + 1, e)));
        }
    }

    let start = Instant::now();
    let feature_names = dataset.feature_names();
    let (x, y) = dataset.to_arrays();

    let mut scaler = StandardScaler::new();
    let x_scaled = scaler.fit_transform(&x, &feature_names)?;
    debug!(means = ?scaler.means(), scales = ?scaler.scales(), "Fitted scaler");

    let mut classifier = LogisticRegression::from_config(config);
    let report = classifier.fit(&x_scaled, &y)?;
    ensure_finite_fit(&classifier, &report)?;

    if !report.converged {
        warn!(
            max_iter = config.max_iter,
            gradient_norm = report.gradient_norm,
            "ConvergenceWarning: optimiser did not converge, keeping partially fitted model"
        );
    }

    let proba = classifier.predict_proba(&x_scaled)?;
    let mut metrics = ModelMetrics::compute(&y, &proba);
    metrics.training_time_secs = start.elapsed().as_secs_f64();
    metrics.n_features = FEATURE_NAMES.len();

    info!(
        samples = dataset.len(),
        iterations = report.n_iter,
        converged = report.converged,
        loss = report.final_loss,
        accuracy = metrics.accuracy,
        "Training complete"
    );

    Ok(TrainedArtifacts {
        scaler,
        classifier,
        report,
        metrics,
        config: config.clone(),
    })
}

/// Refuse a fit whose parameters or loss blew up
fn ensure_finite_fit(classifier: &LogisticRegression, report: &FitReport) -> Result<()> {
    let coefficients_finite = classifier
        .coefficients()
        .map_or(false, |w| w.iter().all(|v| v.is_finite()));
    let intercept_finite = classifier.intercept().map_or(false, f64::is_finite);

    if !(coefficients_finite && intercept_finite && report.final_loss.is_finite()) {
        return Err(ScoutError::DatasetError(format!(
            "training produced non-finite parameters (loss {}); check the input data",
            report.final_loss
        )));
    }
    Ok(())
}
