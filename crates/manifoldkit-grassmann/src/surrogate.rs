//! Regression surrogate interface used by kriging interpolation.
//!
//! The surrogate itself (a Gaussian-process regressor) lives outside this
//! crate. Kriging interpolation only needs a factory that fits a surrogate
//! to `(samples, values)` and a fitted surrogate that predicts at a query.

use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::{DVector, Scalar},
};
use std::fmt::Debug;

/// Trend function of the kriging model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegressionModel {
    /// Constant mean.
    #[default]
    Constant,
    /// Mean affine in the coordinates.
    Linear,
    /// Mean with all linear, square and cross terms.
    Quadratic,
}

/// Correlation (covariance) function of the kriging model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrelationModel {
    /// `exp(-θ|h|)`.
    Exponential,
    /// `exp(-θh²)`.
    #[default]
    Gaussian,
    /// `max(0, 1 - θ|h|)`.
    Linear,
    /// Spherical variogram with compact support `1/θ`.
    Spherical,
    /// Cubic polynomial with compact support `1/θ`.
    Cubic,
    /// Cubic spline with compact support `1/θ`.
    Spline,
}

/// Configuration handed to a [`SurrogateFactory`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KrigingConfig {
    /// Trend model.
    pub regression_model: RegressionModel,
    /// Correlation model.
    pub correlation_model: CorrelationModel,
    /// Number of optimizer restarts used when fitting hyperparameters.
    pub restarts: usize,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            regression_model: RegressionModel::Constant,
            correlation_model: CorrelationModel::Gaussian,
            restarts: 1,
        }
    }
}

impl KrigingConfig {
    /// Creates a configuration with the default models and one restart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the regression model.
    pub fn with_regression_model(mut self, model: RegressionModel) -> Self {
        self.regression_model = model;
        self
    }

    /// Sets the correlation model.
    pub fn with_correlation_model(mut self, model: CorrelationModel) -> Self {
        self.correlation_model = model;
        self
    }

    /// Sets the optimizer restart count.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Checks that the configuration can be used to fit a surrogate.
    pub fn validate(&self) -> Result<()> {
        if self.restarts == 0 {
            return Err(ManifoldError::invalid_parameter(
                "kriging needs at least one optimizer restart",
            ));
        }
        Ok(())
    }
}

/// A prediction of a fitted surrogate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction<T> {
    /// Predicted value.
    pub value: T,
    /// Mean squared error, when requested and supported.
    pub mse: Option<T>,
}

impl<T> Prediction<T> {
    /// A prediction without an error estimate.
    pub fn value(value: T) -> Self {
        Self { value, mse: None }
    }
}

/// A fitted regression surrogate.
pub trait Surrogate<T: Scalar>: Send + Sync {
    /// Predicts at `query`, including the MSE if `want_error` is set.
    fn predict(&self, query: &DVector<T>, want_error: bool) -> Result<Prediction<T>>;
}

/// Builds a [`Surrogate`] from training data.
pub trait SurrogateFactory<T: Scalar>: Send + Sync + Debug {
    /// Fits a surrogate to `values` observed at `samples`.
    fn fit(
        &self,
        samples: &[DVector<T>],
        values: &[T],
        config: &KrigingConfig,
    ) -> Result<Box<dyn Surrogate<T>>>;
}
