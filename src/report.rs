//! Human-readable scouting verdicts

use crate::data::{FeatureVector, Label, RangeWarning};
use crate::inference::Prediction;
use serde::{Deserialize, Serialize};

/// Display-only scores derived from the raw stats.
///
/// These never feed back into the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScores {
    pub aggression: f64,
    pub accuracy: f64,
    pub team_support: f64,
    pub survival: f64,
}

impl PerformanceScores {
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            aggression: features.kills * 10.0,
            accuracy: features.headshots * 20.0,
            team_support: features.revives * 15.0,
            survival: features.distance / 100.0,
        }
    }

    /// (label, value) pairs in display order
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("Aggression", self.aggression),
            ("Accuracy", self.accuracy),
            ("Team Support", self.team_support),
            ("Survival", self.survival),
        ]
    }
}

/// A prediction dressed up for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutReport {
    pub label: Label,
    /// 0 or 1
    pub label_value: u8,
    pub probability: f64,
    /// `probability * 100`, rounded to one decimal place
    pub confidence_percent: f64,
    pub title: String,
    pub verdict: String,
    pub confidence_line: String,
    pub scores: PerformanceScores,
    pub warnings: Vec<RangeWarning>,
}

impl ScoutReport {
    pub fn from_prediction(features: &FeatureVector, prediction: &Prediction) -> Self {
        let (title, verdict) = headline(prediction.label);
        // Line and number share one rounding
        let confidence_percent = (prediction.probability * 1000.0).round() / 10.0;
        Self {
            label: prediction.label,
            label_value: prediction.label.as_u8(),
            probability: prediction.probability,
            confidence_percent,
            title: title.to_string(),
            verdict: verdict.to_string(),
            confidence_line: format!("SCOUT CONFIDENCE: {:.1}%", confidence_percent),
            scores: PerformanceScores::from_features(features),
            warnings: prediction.range_warnings.clone(),
        }
    }

    pub fn is_pro(&self) -> bool {
        self.label == Label::Pro
    }
}

/// (title, verdict) for a label
pub fn headline(label: Label) -> (&'static str, &'static str) {
    match label {
        Label::Pro => ("WINNER WINNER CHICKEN DINNER!", "PRO LEAGUE CANDIDATE"),
        Label::NotPro => ("MISSION FAILED", "RE-TRAINING REQUIRED: AMATEUR STATUS"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: f64) -> Prediction {
        Prediction {
            label: Label::from_probability(probability),
            probability,
            range_warnings: Vec::new(),
        }
    }

    #[test]
    fn test_pro_report() {
        let report = ScoutReport::from_prediction(&FeatureVector::default(), &prediction(0.8768));
        assert!(report.is_pro());
        assert_eq!(report.title, "WINNER WINNER CHICKEN DINNER!");
        assert_eq!(report.verdict, "PRO LEAGUE CANDIDATE");
        assert_eq!(report.confidence_line, "SCOUT CONFIDENCE: 87.7%");
        assert_eq!(report.confidence_percent, 87.7);
        assert_eq!(report.label_value, 1);
    }

    #[test]
    fn test_amateur_report_shows_pro_probability() {
        let report = ScoutReport::from_prediction(&FeatureVector::default(), &prediction(0.123));
        assert_eq!(report.title, "MISSION FAILED");
        assert_eq!(report.verdict, "RE-TRAINING REQUIRED: AMATEUR STATUS");
        assert_eq!(report.confidence_line, "SCOUT CONFIDENCE: 12.3%");
    }

    #[test]
    fn test_confidence_line_matches_percent() {
        let ties = [0.8765, 0.1235, 0.0005, 0.9995, 0.5005, 0.2345];
        let grid = (0..=2000).map(|k| k as f64 / 2000.0);
        for p in ties.into_iter().chain(grid) {
            let report = ScoutReport::from_prediction(&FeatureVector::default(), &prediction(p));
            let shown: f64 = report
                .confidence_line
                .trim_start_matches("SCOUT CONFIDENCE: ")
                .trim_end_matches('%')
                .parse()
                .unwrap();
            assert_eq!(shown, report.confidence_percent, "p = {}", p);
        }
    }

    #[test]
    fn test_performance_scores() {
        let scores = PerformanceScores::from_features(&FeatureVector::default());
        assert_eq!(scores.aggression, 50.0);
        assert_eq!(scores.accuracy, 20.0);
        assert_eq!(scores.team_support, 15.0);
        assert_eq!(scores.survival, 12.0);
        assert_eq!(scores.entries()[2].0, "Team Support");
    }
}
