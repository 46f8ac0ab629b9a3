//! Alpha-normalized diffusion operator.
//!
//! With `D` the kernel's row sums, the operator is
//! `Ps = diag(D^-α) · K · diag(D^-α)`. For `α = 1/2` its eigenvectors,
//! rescaled by `D^-α`, are those of the random-walk operator `D⁻¹K`.

use crate::{
    error::{DiffusionError, Result},
    kernel::KernelMatrix,
};
use manifoldkit_core::{
    error::ManifoldError,
    types::{DVector, Scalar},
};
use num_traits::Float;

/// Degree vector `D` and its element-wise power `D^-α`.
///
/// # Errors
///
/// `InvalidParameter` if a row sum is not strictly positive.
pub fn degree_vector<T: Scalar>(
    kernel: &KernelMatrix<T>,
    alpha: T,
) -> Result<(DVector<T>, DVector<T>)> {
    let degrees = kernel.row_sums();
    if let Some(i) = degrees.iter().position(|&d| !(d > T::zero())) {
        return Err(DiffusionError::invalid_parameter(format!(
            "kernel row {} has non-positive degree {}",
            i, degrees[i]
        )));
    }

    let inv_alpha = degrees.map(|d| <T as Float>::powf(d, -alpha));
    Ok((degrees, inv_alpha))
}

/// Returns `diag(d) · K · diag(d)` in the kernel's own layout.
pub fn l_alpha_normalize<T: Scalar>(
    kernel: &KernelMatrix<T>,
    d_inv_alpha: &DVector<T>,
) -> Result<KernelMatrix<T>> {
    match kernel {
        KernelMatrix::Dense(k) => {
            if d_inv_alpha.len() != k.nrows() {
                return Err(ManifoldError::dimension_mismatch(
                    format!("scaling vector of length {}", k.nrows()),
                    format!("length {}", d_inv_alpha.len()),
                )
                .into());
            }
            let ps = k.map_with_location(|i, j, v| d_inv_alpha[i] * v * d_inv_alpha[j]);
            Ok(KernelMatrix::Dense(ps))
        }
        KernelMatrix::Sparse(k) => Ok(KernelMatrix::Sparse(k.scale_symmetric(d_inv_alpha)?)),
    }
}
