//! Eigensolvers for the symmetric diffusion operator.
//!
//! Both solvers return eigenpairs sorted by decreasing absolute eigenvalue.
//! The dense path is a full symmetric decomposition keeping the pairs of
//! largest magnitude. The sparse path keeps the pairs of largest algebraic
//! value: it runs a shifted block subspace iteration with Rayleigh-Ritz
//! extraction and only touches the operator through sparse-dense products.

use crate::error::{DiffusionError, Result};
use log::{debug, warn};
use manifoldkit_core::{
    linalg::{orthonormalize, random_orthonormal},
    sparse::CsrMatrix,
    types::{DMatrix, DVector, Scalar},
};
use nalgebra::SymmetricEigen;
use num_traits::Float;
use rand::{rngs::StdRng, SeedableRng};

/// Seed of the sparse solver's starting block.
const START_SEED: u64 = 0x5eed;

/// Eigenvalues with their eigenvectors stored column-wise.
#[derive(Debug, Clone)]
pub struct EigenPairs<T: Scalar> {
    /// Eigenvalues, largest magnitude first.
    pub values: DVector<T>,
    /// Unit eigenvectors, one per column.
    pub vectors: DMatrix<T>,
}

impl<T: Scalar> EigenPairs<T> {
    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The `count` eigenpairs of largest magnitude of a dense symmetric matrix.
///
/// An asymmetric input is replaced by `(A + Aᵀ)/2`; a warning is logged when
/// the asymmetry exceeds round-off.
pub fn dense_eigen<T: Scalar>(matrix: &DMatrix<T>, count: usize) -> Result<EigenPairs<T>> {
    let n = check_request(matrix.nrows(), matrix.ncols(), count)?;

    let eig = SymmetricEigen::new(symmetric_part(matrix));
    let order = order_by_magnitude(eig.eigenvalues.as_slice());
    debug!("Dense eigendecomposition of a {}x{} operator", n, n);

    Ok(select(&eig.eigenvalues, &eig.eigenvectors, &order[..count]))
}

/// The `count` eigenpairs of largest algebraic value of a sparse symmetric
/// matrix, returned by decreasing magnitude.
///
/// The iteration runs on `A + σI`, with `σ` the Gershgorin lower bound of the
/// spectrum, so that the dominant subspace is the one of the largest
/// eigenvalues even when `A` has large negative ones. Iterates until every
/// requested Ritz pair satisfies `‖Ax − θx‖ ≤ tolerance · max(|θ|, 1)` or the
/// iteration budget runs out, in which case the last Ritz pairs are returned
/// with a warning. Falls back to a dense decomposition with the same
/// selection when the search block would cover the whole space.
pub fn sparse_eigen<T: Scalar>(
    matrix: &CsrMatrix<T>,
    count: usize,
    tolerance: T,
    max_iterations: usize,
) -> Result<EigenPairs<T>> {
    let n = check_request(matrix.nrows(), matrix.ncols(), count)?;
    if max_iterations == 0 {
        return Err(DiffusionError::invalid_parameter(
            "max_iterations must be at least 1",
        ));
    }

    let block = (2 * count).max(count + 8);
    if block >= n {
        debug!("Search block covers all {} rows; using the dense solver", n);
        let eig = SymmetricEigen::new(symmetric_part(&matrix.to_dense()));
        let order = largest_then_by_magnitude(eig.eigenvalues.as_slice(), count);
        return Ok(select(&eig.eigenvalues, &eig.eigenvectors, &order));
    }

    let shift = gershgorin_shift(matrix);
    let mut rng = StdRng::seed_from_u64(START_SEED);
    let mut q: DMatrix<T> = random_orthonormal(n, block, &mut rng);
    let mut aq = matrix.mul_dense(&q)?;

    for iteration in 1..=max_iterations {
        let h = q.transpose() * &aq;
        let h = (&h + h.transpose()) * <T as Scalar>::from_f64(0.5);
        let ritz = SymmetricEigen::new(h);
        let order = order_by_value(ritz.eigenvalues.as_slice());

        let w = DMatrix::from_fn(block, block, |i, j| ritz.eigenvectors[(i, order[j])]);
        let theta = DVector::from_fn(block, |j, _| ritz.eigenvalues[order[j]]);
        let x = &q * &w;
        let ax = &aq * &w;

        let mut worst = T::zero();
        for j in 0..count {
            let residual = (ax.column(j) - x.column(j) * theta[j]).norm();
            let scale = <T as Float>::max(<T as Float>::abs(theta[j]), T::one());
            worst = <T as Float>::max(worst, residual / scale);
        }

        if worst <= tolerance || iteration == max_iterations {
            if worst <= tolerance {
                debug!(
                    "Subspace iteration converged after {} iterations (residual {:e}, shift {:e})",
                    iteration,
                    <T as Scalar>::to_f64(worst),
                    <T as Scalar>::to_f64(shift)
                );
            } else {
                warn!(
                    "Subspace iteration stopped after {} iterations with residual {:e}",
                    iteration,
                    <T as Scalar>::to_f64(worst)
                );
            }
            let selected = theta.rows(0, count).clone_owned();
            let order = order_by_magnitude(selected.as_slice());
            return Ok(select(&selected, &x, &order));
        }

        q = orthonormalize(&(ax + x * shift));
        aq = matrix.mul_dense(&q)?;
    }

    Err(DiffusionError::eigen_solver("subspace iteration did not run"))
}

/// `(A + Aᵀ)/2`, with a warning when `A` is asymmetric beyond round-off.
fn symmetric_part<T: Scalar>(matrix: &DMatrix<T>) -> DMatrix<T> {
    let norm = matrix.norm();
    let asymmetry = (matrix - matrix.transpose()).norm();
    if norm > T::zero() && asymmetry > <T as Float>::sqrt(T::EPSILON) * norm {
        warn!(
            "Operator is not symmetric (relative asymmetry {:e}); using its symmetric part",
            <T as Scalar>::to_f64(asymmetry / norm)
        );
    }
    (matrix + matrix.transpose()) * <T as Scalar>::from_f64(0.5)
}

/// Smallest `σ ≥ 0` for which Gershgorin's theorem makes `A + σI` positive
/// semi-definite: `max(0, maxᵢ (Σⱼ≠ᵢ |aᵢⱼ| − aᵢᵢ))`.
fn gershgorin_shift<T: Scalar>(matrix: &CsrMatrix<T>) -> T {
    (0..matrix.nrows()).fold(T::zero(), |shift, i| {
        let (diagonal, radius) = matrix.row(i).fold((T::zero(), T::zero()), |(d, r), (j, v)| {
            if j == i {
                (d + v, r)
            } else {
                (d, r + <T as Float>::abs(v))
            }
        });
        <T as Float>::max(shift, radius - diagonal)
    })
}

fn check_request(rows: usize, cols: usize, count: usize) -> Result<usize> {
    if rows != cols {
        return Err(DiffusionError::NonSquareKernel { rows, cols });
    }
    if count == 0 || count > rows {
        return Err(DiffusionError::TooManyEigenvectors {
            requested: count,
            size: rows,
        });
    }
    Ok(rows)
}

fn order_by_magnitude<T: Scalar>(values: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        <T as Float>::abs(values[b])
            .partial_cmp(&<T as Float>::abs(values[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

fn order_by_value<T: Scalar>(values: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Indices of the `count` largest values, ordered by decreasing magnitude.
fn largest_then_by_magnitude<T: Scalar>(values: &[T], count: usize) -> Vec<usize> {
    let mut order = order_by_value(values);
    order.truncate(count);
    order.sort_by(|&a, &b| {
        <T as Float>::abs(values[b])
            .partial_cmp(&<T as Float>::abs(values[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

fn select<T: Scalar>(values: &DVector<T>, vectors: &DMatrix<T>, order: &[usize]) -> EigenPairs<T> {
    EigenPairs {
        values: DVector::from_fn(order.len(), |j, _| values[order[j]]),
        vectors: DMatrix::from_fn(vectors.nrows(), order.len(), |i, j| vectors[(i, order[j])]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Symmetric tridiagonal matrix with known spectrum
    /// `2 - 2cos(kπ/(n+1))`, k = 1..n.
    fn laplacian_1d(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                2.0
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_dense_eigen_sorted_by_magnitude() {
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![0.5, -3.0, 2.0, 0.1]));
        let pairs = dense_eigen(&a, 3).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_relative_eq!(pairs.values[0], -3.0, epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(pairs.values[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(pairs.vectors[(1, 0)].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dense_eigen_symmetrizes_input() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 2.0]);
        let pairs = dense_eigen(&a, 2).unwrap();
        assert_relative_eq!(pairs.values[0], 2.5, epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_request_validation() {
        let a = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            dense_eigen(&a, 4),
            Err(DiffusionError::TooManyEigenvectors { requested: 4, size: 3 })
        ));
        assert!(matches!(
            dense_eigen(&DMatrix::<f64>::zeros(2, 3), 1),
            Err(DiffusionError::NonSquareKernel { .. })
        ));
    }

    #[test]
    fn test_sparse_eigen_matches_dense() {
        let n = 40;
        let a = laplacian_1d(n);
        let sparse = CsrMatrix::from_dense(&a, 0.0);

        let dense_pairs = dense_eigen(&a, 3).unwrap();
        let sparse_pairs = sparse_eigen(&sparse, 3, 1e-8, 5000).unwrap();

        for j in 0..3 {
            assert_relative_eq!(sparse_pairs.values[j], dense_pairs.values[j], epsilon = 1e-6);
            let residual = &a * sparse_pairs.vectors.column(j)
                - sparse_pairs.vectors.column(j) * sparse_pairs.values[j];
            assert!(residual.norm() < 1e-6);
        }
    }

    #[test]
    fn test_sparse_eigen_small_matrix_uses_dense_path() {
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 4.0, 2.0]));
        let sparse = CsrMatrix::from_dense(&a, 0.0);
        let pairs = sparse_eigen(&sparse, 2, 1e-10, 10).unwrap();
        assert_relative_eq!(pairs.values[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1], 2.0, epsilon = 1e-12);

        // The dense fallback still selects by value, not by magnitude.
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![0.5, -3.0, 2.0]));
        let sparse = CsrMatrix::from_dense(&a, 0.0);
        let pairs = sparse_eigen(&sparse, 2, 1e-10, 10).unwrap();
        assert_relative_eq!(pairs.values[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sparse_eigen_skips_dominant_negative_eigenvalues() {
        let mut diagonal = vec![0.2, -0.3, -0.8];
        diagonal.extend(std::iter::repeat(-0.9).take(17));
        let a = DMatrix::from_diagonal(&DVector::from_vec(diagonal));
        let sparse = CsrMatrix::from_dense(&a, 0.0);

        let pairs = sparse_eigen(&sparse, 2, 1e-10, 1000).unwrap();
        assert_eq!(pairs.len(), 2);
        // Largest values, reported by decreasing magnitude.
        assert_relative_eq!(pairs.values[0], -0.3, epsilon = 1e-10);
        assert_relative_eq!(pairs.values[1], 0.2, epsilon = 1e-10);
        assert_relative_eq!(pairs.vectors[(1, 0)].abs(), 1.0, epsilon = 1e-8);
        assert_relative_eq!(pairs.vectors[(0, 1)].abs(), 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_gershgorin_shift() {
        let a = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        assert_eq!(gershgorin_shift(&CsrMatrix::from_dense(&a, 0.0)), 0.0);

        let b = DMatrix::from_row_slice(2, 2, &[0.1, 0.9, 0.9, -0.5]);
        assert_relative_eq!(gershgorin_shift(&CsrMatrix::from_dense(&b, 0.0)), 1.4, epsilon = 1e-12);
    }
}
