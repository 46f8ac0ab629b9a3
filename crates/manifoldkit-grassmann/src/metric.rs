//! Distance metrics between subspace representatives.
//!
//! All built-in metrics except the projection distance are functions of the
//! principal angles θᵢ between the two subspaces:
//! ```text
//! cos θᵢ = σᵢ(X₀ᵀ X₁)
//! ```
//! Representatives may have different column counts `k` and `l`. The
//! `|k − l|` missing angles are treated as right angles.

use manifoldkit_core::{
    error::{ManifoldError, Result},
    linalg::thin_svd,
    types::{constants, DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::fmt::{self, Debug};

/// A pairwise distance between two subspace representatives.
///
/// Implementations receive bases that have already been truncated to their
/// ranks. Any type implementing this trait can be registered in a
/// [`StrategyRegistry`](crate::registry::StrategyRegistry) next to the
/// built-ins.
pub trait GrassmannMetric<T: Scalar>: Send + Sync + Debug {
    /// Name under which the metric is registered.
    fn name(&self) -> &str;

    /// Distance between the subspaces spanned by `x0` and `x1`.
    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T>;
}

fn check_ambient<T: Scalar>(x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<()> {
    if x0.nrows() != x1.nrows() {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} rows", x0.nrows()),
            format!("{} rows", x1.nrows()),
        ));
    }
    Ok(())
}

/// Principal angles between the column spaces of `x0` and `x1`.
///
/// Returns `min(k, l)` angles in ascending order. Singular values above one
/// (rounding) are clamped before taking the arc cosine.
pub fn principal_angles<T: Scalar>(x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<DVector<T>> {
    check_ambient(x0, x1)?;
    let r = x0.transpose() * x1;
    let svd = thin_svd(&r)?;
    Ok(svd
        .singular_values
        .map(|s| Float::acos(Float::min(s, T::one()))))
}

fn column_gap<T: Scalar>(x0: &DMatrix<T>, x1: &DMatrix<T>) -> T {
    <T as Scalar>::from_usize(x0.ncols().abs_diff(x1.ncols()))
}

/// Geodesic (arc-length) distance: `sqrt(|k−l|·π²/4 + Σθ²)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrassmannDistance;

impl<T: Scalar> GrassmannMetric<T> for GrassmannDistance {
    fn name(&self) -> &str {
        "grassmann_distance"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        let theta = principal_angles(x0, x1)?;
        let half_pi = constants::frac_pi_2::<T>();
        let sum_sq = theta.iter().fold(T::zero(), |acc, &t| acc + t * t);
        Ok(Float::sqrt(column_gap(x0, x1) * half_pi * half_pi + sum_sq))
    }
}

/// Chordal distance: `sqrt(|k−l| + Σ sin²θ)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordalDistance;

impl<T: Scalar> GrassmannMetric<T> for ChordalDistance {
    fn name(&self) -> &str {
        "chordal_distance"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        let theta = principal_angles(x0, x1)?;
        let sum = theta.iter().fold(T::zero(), |acc, &t| {
            let s = Float::sin(t);
            acc + s * s
        });
        Ok(Float::sqrt(column_gap(x0, x1) + sum))
    }
}

/// Procrustes distance: `sqrt(|k−l| + 2·Σ sin²(θ/2))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcrustesDistance;

impl<T: Scalar> GrassmannMetric<T> for ProcrustesDistance {
    fn name(&self) -> &str {
        "procrustes_distance"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        let theta = principal_angles(x0, x1)?;
        let two = <T as Scalar>::from_f64(2.0);
        let sum = theta.iter().fold(T::zero(), |acc, &t| {
            let s = Float::sin(t / two);
            acc + s * s
        });
        Ok(Float::sqrt(column_gap(x0, x1) + two * sum))
    }
}

/// Projection distance: `arcsin(min(1, ‖(I − X₀X₀ᵀ)X₁‖_F))`.
///
/// The wider basis always plays the role of `X₀`, so the narrower subspace
/// is projected onto the orthogonal complement of the wider one and the
/// metric is symmetric in its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionDistance;

impl<T: Scalar> GrassmannMetric<T> for ProjectionDistance {
    fn name(&self) -> &str {
        "projection_distance"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        check_ambient(x0, x1)?;
        let (wide, narrow) = if x0.ncols() < x1.ncols() { (x1, x0) } else { (x0, x1) };
        let residual = narrow - wide * (wide.transpose() * narrow);
        Ok(Float::asin(Float::min(T::one(), residual.norm())))
    }
}

/// Adapter turning a closure into a named [`GrassmannMetric`].
pub struct MetricFn<F> {
    name: String,
    f: F,
}

impl<F> MetricFn<F> {
    /// Wraps `f` under `name`.
    pub fn new<S: Into<String>>(name: S, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for MetricFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetricFn({})", self.name)
    }
}

impl<T, F> GrassmannMetric<T> for MetricFn<F>
where
    T: Scalar,
    F: Fn(&DMatrix<T>, &DMatrix<T>) -> Result<T> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        (self.f)(x0, x1)
    }
}
