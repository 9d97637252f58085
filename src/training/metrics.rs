//! Classification metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Clamp used when taking logs of predicted probabilities
const PROB_EPS: f64 = 1e-15;

/// Metrics for a fitted binary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// F1 score
    pub f1_score: f64,
    /// Mean negative log-likelihood of the true labels
    pub log_loss: f64,
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Number of samples evaluated
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute metrics from true labels and predicted P(label = 1).
    ///
    /// Hard predictions use the same `p >= 0.5` rule as the predictor.
    pub fn compute(y_true: &Array1<f64>, y_prob: &Array1<f64>) -> Self {
        let n = y_true.len();
        let (tp, fp, tn, fn_) = Self::confusion_counts(y_true, y_prob);

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };

        let accuracy = ratio(tp + tn, n);
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let log_loss = if n > 0 {
            y_true
                .iter()
                .zip(y_prob.iter())
                .map(|(&t, &p)| {
                    let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
                    -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
                })
                .sum::<f64>()
                / n as f64
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1_score,
            log_loss,
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
            training_time_secs: 0.0,
            n_features: 0,
            n_samples: n,
        }
    }

    fn confusion_counts(y_true: &Array1<f64>, y_prob: &Array1<f64>) -> (usize, usize, usize, usize) {
        let mut tp = 0;
        let mut fp = 0;
        let mut tn = 0;
        let mut fn_ = 0;

        for (t, p) in y_true.iter().zip(y_prob.iter()) {
            let t_bool = *t > 0.5;
            let p_bool = *p >= 0.5;

            match (t_bool, p_bool) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        (tp, fp, tn, fn_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_prob = array![0.9, 0.2, 0.8, 0.4, 0.1, 0.7, 0.6, 0.3];

        let metrics = ModelMetrics::compute(&y_true, &y_prob);

        assert_eq!(metrics.true_positives, 3);
        assert_eq!(metrics.true_negatives, 3);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert!((metrics.accuracy - 0.75).abs() < 1e-12);
        assert!((metrics.precision - 0.75).abs() < 1e-12);
        assert!((metrics.recall - 0.75).abs() < 1e-12);
        assert!((metrics.f1_score - 0.75).abs() < 1e-12);
        assert!(metrics.log_loss > 0.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let metrics = ModelMetrics::compute(&array![1.0], &array![0.5]);
        assert_eq!(metrics.true_positives, 1);
    }

    #[test]
    fn test_perfect_confident_predictions() {
        let metrics = ModelMetrics::compute(&array![0.0, 1.0], &array![0.0, 1.0]);
        assert_eq!(metrics.accuracy, 1.0);
        assert!(metrics.log_loss < 1e-12);
    }
}
