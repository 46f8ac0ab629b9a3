//! Error types for manifold operations.
//!
//! This module defines the error type shared by the Grassmann toolkit and
//! the linear-algebra primitives. Every failure is surfaced synchronously to
//! the immediate caller; nothing in the workspace retries.

use thiserror::Error;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, Error)]
pub enum ManifoldError {
    /// Dimension mismatch between matrices.
    ///
    /// Raised when a collection that must share one shape does not, or when
    /// a matrix does not have the shape an operation requires.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// The rank argument does not describe the input collection.
    #[error("Invalid rank argument: {reason}")]
    InvalidRank {
        /// Description of the rank problem
        reason: String,
    },

    /// A scalar parameter is out of its admissible range.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the parameter problem
        reason: String,
    },

    /// The query point lies outside the interpolation element.
    #[error("Point lies outside the element: {reason}")]
    OutsideElement {
        /// Description of the query point
        reason: String,
    },

    /// Numerical failure, such as a singular matrix inversion.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// No strategy of the given kind is registered under the name.
    #[error("Unknown {kind} strategy: {name}")]
    UnknownStrategy {
        /// Strategy kind (metric, kernel, interpolator)
        kind: &'static str,
        /// Name that failed to resolve
        name: String,
    },

    /// The external regression surrogate failed.
    #[error("Surrogate failed: {reason}")]
    Surrogate {
        /// Description reported by the surrogate
        reason: String,
    },
}

impl ManifoldError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidRank error.
    pub fn invalid_rank<S: Into<String>>(reason: S) -> Self {
        Self::InvalidRank {
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Create an OutsideElement error.
    pub fn outside_element<S: Into<String>>(reason: S) -> Self {
        Self::OutsideElement {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create an UnknownStrategy error.
    pub fn unknown_strategy<S: Into<String>>(kind: &'static str, name: S) -> Self {
        Self::UnknownStrategy {
            kind,
            name: name.into(),
        }
    }

    /// Create a Surrogate error.
    pub fn surrogate<S: Into<String>>(reason: S) -> Self {
        Self::Surrogate {
            reason: reason.into(),
        }
    }
}

/// Result type alias for operations that can produce ManifoldError.
pub type Result<T> = std::result::Result<T, ManifoldError>;
