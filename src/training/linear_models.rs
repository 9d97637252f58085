//! Logistic regression

use super::config::{Solver, TrainingConfig};
use crate::error::{Result, ScoutError};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge on the diagonal if A is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    cholesky_solve_inner(a, b).or_else(|| {
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        let mut a_reg = a.clone();
        for k in 0..n {
            a_reg[[k, k]] += ridge;
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();

    // A = L * L^T
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Matrix inversion by Gauss-Jordan elimination with partial pivoting (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    aug.slice_mut(s![.., ..n]).assign(m);
    for i in 0..n {
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let max_row = (col..n)
            .max_by(|&a, &b| aug[[a, col]].abs().total_cmp(&aug[[b, col]].abs()))
            .unwrap_or(col);

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.slice(s![.., n..]).to_owned())
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^z) without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Outcome of a call to [`LogisticRegression::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Optimiser steps taken
    pub n_iter: usize,
    /// Whether the gradient norm fell below the tolerance within the budget
    pub converged: bool,
    /// Regularised objective at the returned parameters
    pub final_loss: f64,
    pub gradient_norm: f64,
}

/// L2-regularised logistic regression for binary classification.
///
/// Minimises `mean(log_loss) + ||w||² / (2·C·n)`; the intercept is not
/// penalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularisation strength
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    /// Learning rate (gradient descent only)
    pub learning_rate: f64,
    pub solver: Solver,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self::from_config(&TrainingConfig::default())
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: config.c,
            max_iter: config.max_iter,
            tol: config.tol,
            learning_rate: config.learning_rate,
            solver: config.solver,
            is_fitted: false,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    /// Fit the model.
    ///
    /// Running out of iterations is not an error: the current parameters are
    /// kept and the report says `converged: false`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FitReport> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ScoutError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ScoutError::DatasetError(
                "cannot fit on an empty dataset".to_string(),
            ));
        }

        let alpha = 1.0 / (self.c * n_samples as f64);
        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        // Design matrix with a trailing column of ones for the Newton Hessian
        let x_aug = match self.solver {
            Solver::Newton => Some(concatenate![Axis(1), x.view(), Array2::<f64>::ones((n_samples, 1))]),
            Solver::GradientDescent => None,
        };

        let mut n_iter = 0;
        let mut converged = false;
        let mut grad_norm;

        loop {
            let (dw, db, proba) = Self::gradient(x, y, &weights, bias, alpha);
            grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                converged = true;
                break;
            }
            if n_iter >= self.max_iter {
                break;
            }

            match &x_aug {
                Some(x_aug) => {
                    let grad = concatenate![Axis(0), dw, Array1::from_elem(1, db)];
                    let step = Self::newton_direction(x_aug, &proba, &grad, alpha, n_features);

                    // Backtracking: halve the step until the objective does not increase
                    let current = Self::objective(x, y, &weights, bias, alpha);
                    let mut t = 1.0;
                    loop {
                        let cand_w = &weights - &(t * &step.slice(s![..n_features]));
                        let cand_b = bias - t * step[n_features];
                        if Self::objective(x, y, &cand_w, cand_b, alpha) <= current || t < 1e-6 {
                            weights = cand_w;
                            bias = cand_b;
                            break;
                        }
                        t *= 0.5;
                    }
                }
                None => {
                    weights = weights - self.learning_rate * dw;
                    bias -= self.learning_rate * db;
                }
            }

            n_iter += 1;
        }

        let final_loss = Self::objective(x, y, &weights, bias, alpha);

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(FitReport {
            n_iter,
            converged,
            final_loss,
            gradient_norm: grad_norm,
        })
    }

    /// Gradient of the objective w.r.t. weights and bias, plus the current probabilities
    fn gradient(
        x: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        bias: f64,
        alpha: f64,
    ) -> (Array1<f64>, f64, Array1<f64>) {
        let n = x.nrows() as f64;
        let proba = (x.dot(weights) + bias).mapv(sigmoid);
        let errors = &proba - y;
        let dw = x.t().dot(&errors) / n + alpha * weights;
        let db = errors.sum() / n;
        (dw, db, proba)
    }

    /// Solve H·step = grad, falling back to the plain gradient if H is singular
    fn newton_direction(
        x_aug: &Array2<f64>,
        proba: &Array1<f64>,
        grad: &Array1<f64>,
        alpha: f64,
        n_features: usize,
    ) -> Array1<f64> {
        let n = x_aug.nrows() as f64;
        let s = proba.mapv(|p| p * (1.0 - p)).insert_axis(Axis(1));
        let weighted = x_aug * &s;
        let mut hessian = x_aug.t().dot(&weighted) / n;
        for j in 0..n_features {
            hessian[[j, j]] += alpha;
        }

        cholesky_solve(&hessian, grad)
            .or_else(|| matrix_inverse(&hessian).map(|inv| inv.dot(grad)))
            .unwrap_or_else(|| grad.clone())
    }

    fn objective(x: &Array2<f64>, y: &Array1<f64>, weights: &Array1<f64>, bias: f64, alpha: f64) -> f64 {
        let margins = x.dot(weights) + bias;
        let log_loss = margins
            .iter()
            .zip(y.iter())
            .map(|(&m, &t)| softplus(m) - t * m)
            .sum::<f64>()
            / x.nrows() as f64;
        log_loss + 0.5 * alpha * weights.dot(weights)
    }

    pub fn n_features(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|c| c.len())
    }

    /// Get coefficients
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Get intercept
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    fn fitted_params(&self) -> Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) if self.is_fitted => Ok((coefficients, intercept)),
            _ => Err(ScoutError::ModelNotFitted),
        }
    }

    /// Linear decision values `x·w + b`
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = self.fitted_params()?;
        if x.ncols() != coefficients.len() {
            return Err(ScoutError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(coefficients) + intercept)
    }

    /// Decision value for a single scaled sample
    pub fn decision_row(&self, row: ArrayView1<f64>) -> Result<f64> {
        let (coefficients, intercept) = self.fitted_params()?;
        if row.len() != coefficients.len() {
            return Err(ScoutError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", row.len()),
            });
        }
        Ok(row.dot(coefficients) + intercept)
    }

    /// Predict probabilities of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Predict class labels (0.0 / 1.0)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }

    #[test]
    fn test_logistic_regression() {
        // Simple linearly separable data
        let x = array![
            [1.0, 1.0],
            [1.5, 1.5],
            [2.0, 2.0],
            [5.0, 5.0],
            [5.5, 5.5],
            [6.0, 6.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new();
        let report = model.fit(&x, &y).unwrap();
        assert!(model.is_fitted);
        assert!(report.converged);

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy >= 0.8, "Accuracy should be >= 0.8, got {}", accuracy);
    }

    #[test]
    fn test_predict_proba() {
        let x = array![[0.0, 0.0], [10.0, 10.0]];
        let y = array![0.0, 1.0];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();

        // First sample should have low probability, second should have high
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_newton_and_gradient_descent_agree() {
        let x = array![[-2.0], [-1.0], [-0.5], [0.5], [1.0], [2.0]];
        let y = array![0.0, 0.0, 1.0, 0.0, 1.0, 1.0];

        let mut newton = LogisticRegression::new().with_tol(1e-10);
        let newton_report = newton.fit(&x, &y).unwrap();

        let mut gd = LogisticRegression::new()
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(0.5)
            .with_max_iter(20_000)
            .with_tol(1e-10);
        let gd_report = gd.fit(&x, &y).unwrap();

        assert!(newton_report.converged);
        assert!(gd_report.converged);
        assert!(newton_report.n_iter < gd_report.n_iter);

        let wn = newton.coefficients.as_ref().unwrap()[0];
        let wg = gd.coefficients.as_ref().unwrap()[0];
        assert!((wn - wg).abs() < 1e-6, "newton {} vs gd {}", wn, wg);
        assert!((newton.intercept.unwrap() - gd.intercept.unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let x = array![[-2.0], [-1.0], [1.0], [2.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut model = LogisticRegression::new()
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(0.01)
            .with_max_iter(3);
        let report = model.fit(&x, &y).unwrap();

        assert!(!report.converged);
        assert_eq!(report.n_iter, 3);
        // The partial fit is still usable
        assert!(model.is_fitted);
        assert!(model.coefficients.as_ref().unwrap()[0] > 0.0);
    }

    #[test]
    fn test_stronger_regularisation_shrinks_weights() {
        let x = array![[-2.0], [-1.0], [-0.5], [0.5], [1.0], [2.0]];
        let y = array![0.0, 0.0, 1.0, 0.0, 1.0, 1.0];

        let mut loose = LogisticRegression::new().with_c(100.0);
        let mut tight = LogisticRegression::new().with_c(0.01);
        loose.fit(&x, &y).unwrap();
        tight.fit(&x, &y).unwrap();

        let w_loose = loose.coefficients.as_ref().unwrap()[0].abs();
        let w_tight = tight.coefficients.as_ref().unwrap()[0].abs();
        assert!(w_tight < w_loose);
    }

    #[test]
    fn test_unfitted_and_shape_errors() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict_proba(&array![[1.0]]),
            Err(ScoutError::ModelNotFitted)
        ));

        let mut model = LogisticRegression::new();
        model.fit(&array![[0.0, 1.0], [1.0, 0.0]], &array![0.0, 1.0]).unwrap();
        assert!(matches!(
            model.decision_function(&array![[1.0, 2.0, 3.0]]),
            Err(ScoutError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_cholesky_matches_inverse() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = array![1.0, 2.0];
        let x1 = cholesky_solve(&a, &b).unwrap();
        let x2 = matrix_inverse(&a).unwrap().dot(&b);
        assert!((&x1 - &x2).iter().all(|v| v.abs() < 1e-12));
    }
}
