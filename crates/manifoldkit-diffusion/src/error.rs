//! Error types for the diffusion embedding.

use manifoldkit_core::ManifoldError;
use thiserror::Error;

/// Errors that can occur while building a diffusion embedding.
#[derive(Debug, Clone, Error)]
pub enum DiffusionError {
    /// Neither a dataset nor a kernel matrix was supplied.
    #[error("Either data or a kernel matrix must be provided")]
    MissingInput,

    /// The supplied kernel matrix is not square.
    #[error("Kernel matrix must be square, got {rows}x{cols}")]
    NonSquareKernel {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// More eigenvectors were requested than the kernel has rows.
    #[error("Requested {requested} eigenvectors from a kernel of size {size}")]
    TooManyEigenvectors {
        /// Requested embedding dimension
        requested: usize,
        /// Kernel matrix size
        size: usize,
    },

    /// A configuration value or input is out of range.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the parameter problem
        reason: String,
    },

    /// The eigensolver could not produce the requested pairs.
    #[error("Eigensolver failed: {reason}")]
    EigenSolver {
        /// Description of the failure
        reason: String,
    },

    /// Error raised by a shared linear-algebra primitive.
    #[error(transparent)]
    Manifold(#[from] ManifoldError),
}

impl DiffusionError {
    /// Creates an invalid parameter error.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Creates an eigensolver error.
    pub fn eigen_solver<S: Into<String>>(reason: S) -> Self {
        Self::EigenSolver {
            reason: reason.into(),
        }
    }
}

/// Result type for diffusion operations.
pub type Result<T> = std::result::Result<T, DiffusionError>;
