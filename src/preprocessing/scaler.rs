//! Standard (z-score) feature scaling

use crate::error::{Result, ScoutError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Fitted parameters for one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean
    scale: f64,  // population std, 1.0 when the feature is constant
}

/// Per-feature standardisation: `(x - mean) / std`.
///
/// Parameters are kept in the column order seen at fit time together with
/// the feature names, so a scaler can only be applied to data laid out the
/// same way. A feature with zero variance gets a scale of 1 and is only
/// centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            feature_names: Vec::new(),
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler on an (n_samples × n_features) matrix
    pub fn fit(&mut self, x: &Array2<f64>, feature_names: &[String]) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(ScoutError::DatasetError(
                "cannot fit scaler on an empty dataset".to_string(),
            ));
        }
        if feature_names.len() != x.ncols() {
            return Err(ScoutError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(Self::compute_params)
            .collect();
        self.feature_names = feature_names.to_vec();
        self.is_fitted = true;

        Ok(self)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, feature_names: &[String]) -> Result<Array2<f64>> {
        self.fit(x, feature_names)?;
        self.transform(x)
    }

    /// Scale every row of `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;

        let mut scaled = x.clone();
        for (mut column, params) in scaled.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(scaled)
    }

    /// Scale a single sample
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>> {
        self.check_width(row.len())?;

        Ok(row
            .iter()
            .zip(&self.params)
            .map(|(v, params)| (v - params.center) / params.scale)
            .collect())
    }

    /// Undo the scaling
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;

        let mut unscaled = x.clone();
        for (mut column, params) in unscaled.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| v * params.scale + params.center);
        }
        Ok(unscaled)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn n_features(&self) -> usize {
        self.params.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn means(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.center).collect()
    }

    /// Effective divisors (the std, or 1 for constant features)
    pub fn scales(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.scale).collect()
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(ScoutError::ModelNotFitted);
        }
        if width != self.params.len() {
            return Err(ScoutError::ShapeError {
                expected: format!("{} features", self.params.len()),
                actual: format!("{} features", width),
            });
        }
        Ok(())
    }

    fn compute_params(column: ArrayView1<f64>) -> ScalerParams {
        let mean = column.mean().unwrap_or(0.0);
        let std = column.std(0.0);
        ScalerParams {
            center: mean,
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &names(2)).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            assert!(column.mean().unwrap().abs() < 1e-10); // Mean should be ~0
            assert!((column.std(0.0) - 1.0).abs() < 1e-10);
        }
        assert!((scaler.means()[0] - 3.0).abs() < 1e-12);
        assert!((scaler.scales()[0] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_value_at_mean_scales_to_zero() {
        let x = array![[0.0, 100.0], [4.0, 300.0], [8.0, 200.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x, &names(2)).unwrap();

        let means = scaler.means();
        let scaled = scaler.transform_row(&means).unwrap();
        assert!(scaled.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_zero_variance_feature_is_only_centred() {
        let x = array![[7.0, 1.0], [7.0, 2.0], [7.0, 3.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &names(2)).unwrap();

        assert_eq!(scaler.scales()[0], 1.0);
        assert!(scaled.column(0).iter().all(|v| *v == 0.0));
        let shifted = scaler.transform_row(&[9.0, 2.0]).unwrap();
        assert_eq!(shifted[0], 2.0);
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, 5.0], [2.0, 3.0], [3.0, 9.0], [4.0, 1.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &names(2)).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (o, r) in x.iter().zip(restored.iter()) {
            assert!((o - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x, &names(2)).unwrap();

        assert!(matches!(
            scaler.transform_row(&[1.0, 2.0, 3.0]),
            Err(ScoutError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_unfitted() {
        let scaler = StandardScaler::new();
        assert!(matches!(scaler.transform_row(&[1.0]), Err(ScoutError::ModelNotFitted)));
    }
}
