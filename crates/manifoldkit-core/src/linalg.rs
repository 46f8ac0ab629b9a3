//! Dense linear-algebra primitives used throughout the toolkit.
//!
//! The truncated SVD is treated as a trusted primitive: it wraps nalgebra's
//! thin SVD and only adds ordering and truncation. Everything else here is
//! the small amount of glue the manifold operations share (numerical rank,
//! orthonormality checks, QR re-orthonormalization).

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Thin singular value decomposition `A ≈ U diag(s) Vᵀ`.
///
/// Singular values are sorted in descending order and the factors are
/// truncated to the requested rank.
#[derive(Debug, Clone)]
pub struct Svd<T: Scalar> {
    /// Left singular vectors, `m × k`, orthonormal columns.
    pub u: DMatrix<T>,
    /// Singular values, length `k`, descending.
    pub singular_values: DVector<T>,
    /// Right singular vectors transposed, `k × n`.
    pub v_t: DMatrix<T>,
}

impl<T: Scalar> Svd<T> {
    /// Number of retained components.
    #[inline]
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Right singular vectors as columns, `n × k`.
    pub fn v(&self) -> DMatrix<T> {
        self.v_t.transpose()
    }

    /// Singular values as a `k × k` diagonal matrix.
    pub fn sigma(&self) -> DMatrix<T> {
        DMatrix::from_diagonal(&self.singular_values)
    }
}

/// Computes the thin SVD of `matrix` truncated to its `rank` leading components.
///
/// # Errors
///
/// - `InvalidRank` if `rank` is zero or exceeds `min(m, n)`.
/// - `NumericalError` if the decomposition does not produce both factors.
pub fn truncated_svd<T: Scalar>(matrix: &DMatrix<T>, rank: usize) -> Result<Svd<T>> {
    let max_rank = matrix.nrows().min(matrix.ncols());
    if rank == 0 || rank > max_rank {
        return Err(ManifoldError::invalid_rank(format!(
            "rank must be in 1..={} for a {}x{} matrix, got {}",
            max_rank,
            matrix.nrows(),
            matrix.ncols(),
            rank
        )));
    }

    let svd = matrix.clone().svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => {
            return Err(ManifoldError::numerical_error(
                "SVD failed to compute singular vectors",
            ))
        }
    };

    let s = svd.singular_values;
    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(std::cmp::Ordering::Equal));
    order.truncate(rank);

    let u_trunc = DMatrix::from_fn(u.nrows(), rank, |i, j| u[(i, order[j])]);
    let v_t_trunc = DMatrix::from_fn(rank, v_t.ncols(), |i, j| v_t[(order[i], j)]);
    let s_trunc = DVector::from_fn(rank, |i, _| s[order[i]]);

    Ok(Svd {
        u: u_trunc,
        singular_values: s_trunc,
        v_t: v_t_trunc,
    })
}

/// Full thin SVD, keeping all `min(m, n)` components.
pub fn thin_svd<T: Scalar>(matrix: &DMatrix<T>) -> Result<Svd<T>> {
    truncated_svd(matrix, matrix.nrows().min(matrix.ncols()))
}

/// Numerical rank: number of singular values above `σ_max · max(m, n) · ε`.
pub fn numerical_rank<T: Scalar>(matrix: &DMatrix<T>) -> usize {
    if matrix.is_empty() {
        return 0;
    }
    let s = matrix.singular_values();
    let s_max = s.iter().fold(T::zero(), |acc, &v| <T as Float>::max(acc, v));
    let dim = <T as Scalar>::from_usize(matrix.nrows().max(matrix.ncols()));
    let tol = s_max * dim * <T as Scalar>::EPSILON;
    s.iter().filter(|&&v| v > tol).count()
}

/// Element-wise closeness: `|a - b| ≤ atol + rtol·|b|` for every entry.
pub fn allclose<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>, rtol: T, atol: T) -> bool {
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(&x, &y)| <T as Float>::abs(x - y) <= atol + rtol * <T as Float>::abs(y))
}

/// Checks `XᵀX ≈ I` with the scalar type's default tolerances.
pub fn is_orthonormal<T: Scalar>(x: &DMatrix<T>) -> bool {
    let xtx = x.transpose() * x;
    let identity = DMatrix::<T>::identity(xtx.nrows(), xtx.ncols());
    allclose(
        &xtx,
        &identity,
        T::RELATIVE_TOLERANCE,
        T::ORTHOGONALITY_TOLERANCE,
    )
}

/// Re-orthonormalizes the columns of `x` through a thin QR decomposition.
///
/// Column signs are fixed so that `diag(R) ≥ 0`, which keeps the result
/// continuous with respect to small perturbations of `x`.
pub fn orthonormalize<T: Scalar>(x: &DMatrix<T>) -> DMatrix<T> {
    let p = x.ncols().min(x.nrows());
    let qr = x.clone().qr();
    let mut q = qr.q();
    if q.ncols() > p {
        q = q.columns(0, p).clone_owned();
    }

    let r = qr.r();
    for j in 0..p.min(r.ncols()) {
        if r[(j, j)] < T::zero() {
            for i in 0..q.nrows() {
                q[(i, j)] = -q[(i, j)];
            }
        }
    }
    q
}

/// Random `n × p` matrix with orthonormal columns (Gaussian matrix → QR).
pub fn random_orthonormal<T: Scalar, R: Rng + ?Sized>(n: usize, p: usize, rng: &mut R) -> DMatrix<T> {
    let a = DMatrix::from_fn(n, p, |_, _| {
        let v: f64 = StandardNormal.sample(rng);
        <T as Scalar>::from_f64(v)
    });
    orthonormalize(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_truncated_svd_sorted_and_truncated() {
        let a = DMatrix::from_row_slice(4, 3, &[
            1.0, 0.0, 0.0,
            0.0, 3.0, 0.0,
            0.0, 0.0, 2.0,
            0.0, 0.0, 0.0,
        ]);
        let svd = truncated_svd(&a, 2).unwrap();
        assert_eq!(svd.u.shape(), (4, 2));
        assert_eq!(svd.v_t.shape(), (2, 3));
        assert_relative_eq!(svd.singular_values[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(svd.singular_values[1], 2.0, epsilon = 1e-12);
        assert!(is_orthonormal(&svd.u));
    }

    #[test]
    fn test_truncated_svd_rejects_bad_rank() {
        let a = DMatrix::<f64>::identity(3, 2);
        assert!(matches!(truncated_svd(&a, 0), Err(ManifoldError::InvalidRank { .. })));
        assert!(matches!(truncated_svd(&a, 3), Err(ManifoldError::InvalidRank { .. })));
    }

    #[test]
    fn test_svd_reconstruction() {
        let a = DMatrix::from_fn(5, 3, |i, j| (i as f64 + 1.0) * 0.3 - (j as f64) * 0.7 + ((i * j) as f64).sin());
        let svd = thin_svd(&a).unwrap();
        let rebuilt = &svd.u * svd.sigma() * &svd.v_t;
        assert_relative_eq!(rebuilt, a, epsilon = 1e-10);
    }

    #[test]
    fn test_numerical_rank() {
        let mut a = DMatrix::<f64>::zeros(6, 4);
        a.set_column(0, &DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        a.set_column(1, &DVector::from_vec(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]));
        let col0 = a.column(0).clone_owned();
        let col1 = a.column(1).clone_owned();
        a.set_column(2, &(col0 * 2.0 - col1));
        assert_eq!(numerical_rank(&a), 2);
        assert_eq!(numerical_rank(&DMatrix::<f64>::identity(5, 5)), 5);
        assert_eq!(numerical_rank(&DMatrix::<f64>::zeros(3, 3)), 0);
    }

    #[test]
    fn test_orthonormalize() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
        let q = orthonormalize(&a);
        assert!(is_orthonormal(&q));
        // Column space is preserved: projecting a onto span(q) recovers a.
        let projected = &q * (q.transpose() * &a);
        assert_relative_eq!(projected, a, epsilon = 1e-12);
    }

    #[test]
    fn test_random_orthonormal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5 {
            let x: DMatrix<f64> = random_orthonormal(10, 3, &mut rng);
            assert_eq!(x.shape(), (10, 3));
            assert!(is_orthonormal(&x));
        }
    }

    #[test]
    fn test_allclose() {
        let a = DMatrix::<f64>::identity(2, 2);
        let mut b = a.clone();
        b[(0, 1)] = 1e-10;
        assert!(allclose(&a, &b, 1e-5, 1e-8));
        b[(0, 1)] = 1e-3;
        assert!(!allclose(&a, &b, 1e-5, 1e-8));
    }
}
