//! Type definitions and aliases shared by the manifold toolkit and the
//! diffusion embedding.
//!
//! Every algorithm in the workspace is generic over a [`Scalar`] (`f32` or
//! `f64`). The per-type constants below are the tolerances the algorithms
//! fall back to when the caller does not provide one.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in the toolkit (f32 or f64).
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for iterative convergence checks.
    const DEFAULT_TOLERANCE: Self;

    /// Absolute tolerance used when checking `XᵀX ≈ I`.
    const ORTHOGONALITY_TOLERANCE: Self;

    /// Relative tolerance used by element-wise closeness checks.
    const RELATIVE_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert to f64 (for logging/display).
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for counts used as divisors).
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-3;
    const ORTHOGONALITY_TOLERANCE: Self = 1e-5;
    const RELATIVE_TOLERANCE: Self = 1e-4;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-3;
    const ORTHOGONALITY_TOLERANCE: Self = 1e-8;
    const RELATIVE_TOLERANCE: Self = 1e-5;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Numerical constants.
pub mod constants {
    use super::Scalar;

    /// Pi constant.
    pub fn pi<T: Scalar>() -> T {
        <T as Scalar>::from_f64(std::f64::consts::PI)
    }

    /// π/2, the largest principal angle between two subspaces.
    pub fn frac_pi_2<T: Scalar>() -> T {
        <T as Scalar>::from_f64(std::f64::consts::FRAC_PI_2)
    }}
