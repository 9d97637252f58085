//! Training configuration

use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};

/// Optimiser used to fit the logistic regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solver {
    /// Newton-Raphson (iteratively reweighted least squares) with
    /// backtracking line search
    Newton,
    /// Full-batch gradient descent with a fixed learning rate
    GradientDescent,
}

impl std::str::FromStr for Solver {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newton" | "irls" => Ok(Solver::Newton),
            "gd" | "gradient_descent" => Ok(Solver::GradientDescent),
            _ => Err(ScoutError::InvalidParameter {
                name: "solver".to_string(),
                value: s.to_string(),
                reason: "expected one of: newton, gd".to_string(),
            }),
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Inverse L2 regularisation strength (smaller = stronger)
    pub c: f64,
    /// Iteration budget for the optimiser
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    pub solver: Solver,
    /// Step size, gradient descent only
    pub learning_rate: f64,
    /// Minimum number of examples required for each label
    pub min_class_count: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            solver: Solver::Newton,
            learning_rate: 0.5,
            min_class_count: 2,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
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

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_min_class_count(mut self, count: usize) -> Self {
        self.min_class_count = count;
        self
    }

    /// Reject values the optimiser cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(invalid("c", self.c, "must be a positive finite number"));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", self.max_iter, "must be at least 1"));
        }
        if !(self.tol > 0.0) {
            return Err(invalid("tol", self.tol, "must be positive"));
        }
        if self.solver == Solver::GradientDescent && !(self.learning_rate > 0.0) {
            return Err(invalid("learning_rate", self.learning_rate, "must be positive"));
        }
        if self.min_class_count == 0 {
            return Err(invalid("min_class_count", self.min_class_count, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> ScoutError {
    ScoutError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
