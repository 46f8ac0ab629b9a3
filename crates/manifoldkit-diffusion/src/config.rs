//! Configuration for the diffusion maps embedding.

use crate::error::{DiffusionError, Result};
use manifoldkit_core::types::Scalar;

/// Parameters of a [`DiffusionMaps`](crate::DiffusionMaps) run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffusionMapsConfig<T: Scalar> {
    /// Density normalization exponent in `[0, 1]`: 0 gives the graph
    /// Laplacian, 0.5 Fokker-Planck, 1 Laplace-Beltrami.
    pub alpha: T,
    /// Embedding dimension.
    pub n_evecs: usize,
    /// Kernel bandwidth; `None` estimates it from the data.
    pub epsilon: Option<T>,
    /// Keep only this many nearest neighbors per row and switch to the sparse
    /// pipeline.
    pub k_neighbors: Option<usize>,
    /// Residual tolerance of the sparse eigensolver.
    pub eigen_tolerance: T,
    /// Iteration budget of the sparse eigensolver.
    pub max_eigen_iterations: usize,
}

impl<T: Scalar> Default for DiffusionMapsConfig<T> {
    fn default() -> Self {
        Self {
            alpha: <T as Scalar>::from_f64(0.5),
            n_evecs: 2,
            epsilon: None,
            k_neighbors: None,
            eigen_tolerance: T::ORTHOGONALITY_TOLERANCE,
            max_eigen_iterations: 1000,
        }
    }
}

impl<T: Scalar> DiffusionMapsConfig<T> {
    /// Creates a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normalization exponent.
    pub fn with_alpha(mut self, alpha: T) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the embedding dimension.
    pub fn with_n_evecs(mut self, n_evecs: usize) -> Self {
        self.n_evecs = n_evecs;
        self
    }

    /// Fixes the kernel bandwidth.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Sparsifies the kernel to `k` nearest neighbors per row.
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = Some(k);
        self
    }

    /// Sets the sparse eigensolver tolerance.
    pub fn with_eigen_tolerance(mut self, tolerance: T) -> Self {
        self.eigen_tolerance = tolerance;
        self
    }

    /// Sets the sparse eigensolver iteration budget.
    pub fn with_max_eigen_iterations(mut self, max_iterations: usize) -> Self {
        self.max_eigen_iterations = max_iterations;
        self
    }

    /// Whether the sparse pipeline is selected.
    pub fn is_sparse(&self) -> bool {
        self.k_neighbors.is_some()
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha >= T::zero() && self.alpha <= T::one()) {
            return Err(DiffusionError::invalid_parameter(format!(
                "alpha must lie in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.n_evecs == 0 {
            return Err(DiffusionError::invalid_parameter(
                "n_evecs must be at least 1",
            ));
        }
        if let Some(epsilon) = self.epsilon {
            if !(epsilon > T::zero()) {
                return Err(DiffusionError::invalid_parameter(format!(
                    "epsilon must be positive, got {}",
                    epsilon
                )));
            }
        }
        if self.k_neighbors == Some(0) {
            return Err(DiffusionError::invalid_parameter(
                "k_neighbors must be at least 1",
            ));
        }
        if !(self.eigen_tolerance > T::zero()) {
            return Err(DiffusionError::invalid_parameter(format!(
                "eigen_tolerance must be positive, got {}",
                self.eigen_tolerance
            )));
        }
        if self.max_eigen_iterations == 0 {
            return Err(DiffusionError::invalid_parameter(
                "max_eigen_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}
