//! Positive semi-definite kernels on the Grassmann manifold.

use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::{DMatrix, Scalar},
};
use std::fmt::{self, Debug};

/// A kernel function between two subspace representatives.
pub trait GrassmannKernel<T: Scalar>: Send + Sync + Debug {
    /// Name under which the kernel is registered.
    fn name(&self) -> &str;

    /// Kernel value `k(x0, x1)`.
    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T>;
}

fn cross_product<T: Scalar>(x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<DMatrix<T>> {
    if x0.nrows() != x1.nrows() {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} rows", x0.nrows()),
            format!("{} rows", x1.nrows()),
        ));
    }
    Ok(x0.transpose() * x1)
}

/// Projection kernel `‖X₀ᵀX₁‖²_F`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionKernel;

impl<T: Scalar> GrassmannKernel<T> for ProjectionKernel {
    fn name(&self) -> &str {
        "projection_kernel"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        let r = cross_product(x0, x1)?;
        Ok(r.norm_squared())
    }
}

/// Binet–Cauchy kernel `det(X₀ᵀX₁)²`.
///
/// Only defined for representatives with the same number of columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinetCauchyKernel;

impl<T: Scalar> GrassmannKernel<T> for BinetCauchyKernel {
    fn name(&self) -> &str {
        "binet_cauchy_kernel"
    }

    fn compute(&self, x0: &DMatrix<T>, x1: &DMatrix<T>) -> Result<T> {
        if x0.ncols() != x1.ncols() {
            return Err(ManifoldError::dimension_mismatch(
                format!("{} columns", x0.ncols()),
                format!("{} columns", x1.ncols()),
            ));
        }
        let det = cross_product(x0, x1)?.determinant();
        Ok(det * det)
    }
}

/// Adapter turning a closure into a named [`GrassmannKernel`].
pub struct KernelFn<F> {
    name: String,
    f: F,
}

impl<F> KernelFn<F> {
    /// Wraps `f` under `name`.
    pub fn new<S: Into<String>>(name: S, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for KernelFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KernelFn({})", self.name)
    }
}

impl<T, F> GrassmannKernel<T> for KernelFn<F>
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
