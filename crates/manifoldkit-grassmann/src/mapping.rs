//! Logarithmic and exponential maps at a reference point.
//!
//! For a reference `R` and a representative `X` of the same shape:
//!
//! ```text
//! log_R(X) = U atan(Σ) Vᵀ   where U Σ Vᵀ = (I − R Rᵀ) X (Rᵀ X)⁻¹
//! exp_R(Γ) = (R V cos(Σ) + U sin(Σ)) Vᵀ   where U Σ Vᵀ = Γ
//! ```
//!
//! The two maps are mutual inverses in a neighborhood of `R` only.

use log::debug;
use manifoldkit_core::{
    error::{ManifoldError, Result},
    linalg::{allclose, is_orthonormal, orthonormalize, thin_svd},
    types::{DMatrix, Scalar},
};
use num_traits::Float;

fn check_same_shape<T: Scalar>(reference: &DMatrix<T>, x: &DMatrix<T>) -> Result<()> {
    if reference.shape() != x.shape() {
        return Err(ManifoldError::dimension_mismatch(
            format!("{}x{}", reference.nrows(), reference.ncols()),
            format!("{}x{}", x.nrows(), x.ncols()),
        ));
    }
    Ok(())
}

/// Logarithmic map of a single representative.
///
/// A point that is element-wise close to the reference maps to the zero
/// tangent vector.
///
/// # Errors
///
/// - `DimensionMismatch` if `point` and `reference` differ in shape.
/// - `NumericalError` if `Rᵀ X` is singular, which happens when the two
///   subspaces contain mutually orthogonal directions.
pub fn log_map_point<T: Scalar>(point: &DMatrix<T>, reference: &DMatrix<T>) -> Result<DMatrix<T>> {
    check_same_shape(reference, point)?;

    if allclose(
        point,
        reference,
        T::RELATIVE_TOLERANCE,
        T::ORTHOGONALITY_TOLERANCE,
    ) {
        return Ok(DMatrix::zeros(reference.nrows(), reference.ncols()));
    }

    let rtx = reference.transpose() * point;
    let inverse = rtx.try_inverse().ok_or_else(|| {
        ManifoldError::numerical_error(
            "reference and point are too far apart for the logarithmic map (singular RᵀX)",
        )
    })?;

    // (I − R Rᵀ) X without forming the n × n projector.
    let horizontal = point - reference * (reference.transpose() * point);
    let m = horizontal * inverse;

    let svd = thin_svd(&m)?;
    let atan_s = DMatrix::from_diagonal(&svd.singular_values.map(<T as Float>::atan));
    Ok(&svd.u * atan_s * &svd.v_t)
}

/// Exponential map of a single tangent vector.
///
/// The result is re-orthonormalized through QR when `YᵀY` drifts from the
/// identity.
///
/// # Errors
///
/// `DimensionMismatch` if `tangent` and `reference` differ in shape.
pub fn exp_map_point<T: Scalar>(tangent: &DMatrix<T>, reference: &DMatrix<T>) -> Result<DMatrix<T>> {
    check_same_shape(reference, tangent)?;

    let svd = thin_svd(tangent)?;
    let cos_s = DMatrix::from_diagonal(&svd.singular_values.map(<T as Float>::cos));
    let sin_s = DMatrix::from_diagonal(&svd.singular_values.map(<T as Float>::sin));
    let v = svd.v();

    let y = (reference * &v * cos_s + &svd.u * sin_s) * &svd.v_t;
    if is_orthonormal(&y) {
        Ok(y)
    } else {
        debug!("exponential map result drifted from orthonormality, re-orthonormalizing");
        Ok(orthonormalize(&y))
    }
}

/// Logarithmic map of every representative in `points` at `reference`.
pub fn log_map<T: Scalar>(points: &[DMatrix<T>], reference: &DMatrix<T>) -> Result<Vec<DMatrix<T>>> {
    points.iter().map(|p| log_map_point(p, reference)).collect()
}

/// Exponential map of every tangent vector in `tangents` at `reference`.
pub fn exp_map<T: Scalar>(tangents: &[DMatrix<T>], reference: &DMatrix<T>) -> Result<Vec<DMatrix<T>>> {
    tangents.iter().map(|t| exp_map_point(t, reference)).collect()
}
