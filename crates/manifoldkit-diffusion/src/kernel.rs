//! Kernel construction: pairwise distances, bandwidth selection, the
//! Gaussian kernel and its k-nearest-neighbor sparsification.

use crate::error::{DiffusionError, Result};
use log::debug;
use manifoldkit_core::{
    error::ManifoldError,
    pairwise::{pair_indices, squareform},
    sparse::{CooMatrix, CsrMatrix},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Dataset a diffusion kernel is built from.
#[derive(Debug, Clone)]
pub enum DiffusionData<T: Scalar> {
    /// Point cloud, one point per row.
    Points(DMatrix<T>),
    /// Matrix-valued samples of a common shape.
    Matrices(Vec<DMatrix<T>>),
}

impl<T: Scalar> DiffusionData<T> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            DiffusionData::Points(points) => points.nrows(),
            DiffusionData::Matrices(matrices) => matrices.len(),
        }
    }

    /// Whether the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Scalar> From<DMatrix<T>> for DiffusionData<T> {
    fn from(points: DMatrix<T>) -> Self {
        DiffusionData::Points(points)
    }
}

impl<T: Scalar> From<Vec<DMatrix<T>>> for DiffusionData<T> {
    fn from(matrices: Vec<DMatrix<T>>) -> Self {
        DiffusionData::Matrices(matrices)
    }
}

/// A kernel matrix in dense or compressed sparse row layout.
#[derive(Debug, Clone)]
pub enum KernelMatrix<T: Scalar> {
    /// Dense square matrix.
    Dense(DMatrix<T>),
    /// Sparse square matrix.
    Sparse(CsrMatrix<T>),
}

impl<T: Scalar> KernelMatrix<T> {
    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        match self {
            KernelMatrix::Dense(k) => k.nrows(),
            KernelMatrix::Sparse(k) => k.nrows(),
        }
    }

    /// Row sums of the kernel.
    pub fn row_sums(&self) -> DVector<T> {
        match self {
            KernelMatrix::Dense(k) => {
                DVector::from_fn(k.nrows(), |i, _| k.row(i).iter().fold(T::zero(), |acc, &v| acc + v))
            }
            KernelMatrix::Sparse(k) => k.row_sums(),
        }
    }

    /// Dense copy of the kernel.
    pub fn to_dense(&self) -> DMatrix<T> {
        match self {
            KernelMatrix::Dense(k) => k.clone(),
            KernelMatrix::Sparse(k) => k.to_dense(),
        }
    }
}

/// Condensed pairwise distances in canonical pair order.
///
/// Euclidean distance between rows for [`DiffusionData::Points`], Frobenius
/// norm of the difference for [`DiffusionData::Matrices`].
pub fn pairwise_distances<T: Scalar>(data: &DiffusionData<T>) -> Result<Vec<T>> {
    match data {
        DiffusionData::Points(points) => Ok(evaluate_pairs(points.nrows(), |i, j| {
            (points.row(i) - points.row(j)).norm()
        })),
        DiffusionData::Matrices(matrices) => {
            if let Some(first) = matrices.first() {
                let shape = first.shape();
                if let Some(bad) = matrices.iter().find(|m| m.shape() != shape) {
                    return Err(ManifoldError::dimension_mismatch(
                        format!("{}x{}", shape.0, shape.1),
                        format!("{}x{}", bad.nrows(), bad.ncols()),
                    )
                    .into());
                }
            }
            Ok(evaluate_pairs(matrices.len(), |i, j| {
                (&matrices[i] - &matrices[j]).norm()
            }))
        }
    }
}

/// Median of the squared distances, used as the kernel bandwidth.
///
/// For an even count the two middle values are averaged.
pub fn find_epsilon<T: Scalar>(distances: &[T]) -> Result<T> {
    if distances.is_empty() {
        return Err(DiffusionError::invalid_parameter(
            "bandwidth estimation needs at least two samples",
        ));
    }

    let mut squared: Vec<T> = distances.iter().map(|&d| d * d).collect();
    squared.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = squared.len() / 2;
    let epsilon = if squared.len() % 2 == 0 {
        (squared[mid - 1] + squared[mid]) / <T as Scalar>::from_f64(2.0)
    } else {
        squared[mid]
    };

    if !(epsilon > T::zero()) {
        return Err(DiffusionError::invalid_parameter(
            "median squared distance is zero; supply epsilon explicitly",
        ));
    }

    debug!("Estimated kernel bandwidth epsilon = {:e}", <T as Scalar>::to_f64(epsilon));
    Ok(epsilon)
}

/// Square Gaussian kernel `exp(-d² / 4ε)` over `n` samples from condensed
/// distances. The diagonal is one.
pub fn gaussian_kernel<T: Scalar>(distances: &[T], n: usize, epsilon: T) -> Result<DMatrix<T>> {
    if !(epsilon > T::zero()) {
        return Err(DiffusionError::invalid_parameter(format!(
            "epsilon must be positive, got {}",
            epsilon
        )));
    }

    let four_eps = <T as Scalar>::from_f64(4.0) * epsilon;
    let condensed: Vec<T> = distances
        .iter()
        .map(|&d| <T as Float>::exp(-(d * d) / four_eps))
        .collect();
    let diagonal = vec![T::one(); n];
    Ok(squareform(&condensed, &diagonal)?)
}

/// Keeps, in every row, the diagonal and the `k` largest off-diagonal
/// entries. Ties go to the lower column index.
///
/// The result is generally not symmetric.
pub fn sparsify_knn<T: Scalar>(kernel: &DMatrix<T>, k: usize) -> Result<CsrMatrix<T>> {
    let n = kernel.nrows();
    if kernel.ncols() != n {
        return Err(DiffusionError::NonSquareKernel {
            rows: n,
            cols: kernel.ncols(),
        });
    }
    if k == 0 {
        return Err(DiffusionError::invalid_parameter(
            "k_neighbors must be at least 1",
        ));
    }

    let keep = k.min(n.saturating_sub(1));
    let mut coo = CooMatrix::with_capacity(n, n, n * (keep + 1));
    let mut candidates: Vec<usize> = Vec::with_capacity(n);

    for i in 0..n {
        coo.push(i, i, kernel[(i, i)])?;

        candidates.clear();
        candidates.extend((0..n).filter(|&j| j != i));
        candidates.sort_by(|&a, &b| {
            kernel[(i, b)]
                .partial_cmp(&kernel[(i, a)])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        for &j in candidates.iter().take(keep) {
            coo.push(i, j, kernel[(i, j)])?;
        }
    }

    Ok(coo.to_csr())
}

fn evaluate_pairs<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Scalar,
    F: Fn(usize, usize) -> T + Send + Sync,
{
    let pairs = pair_indices(n);

    #[cfg(feature = "parallel")]
    {
        pairs.par_iter().map(|&(i, j)| f(i, j)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs.iter().map(|&(i, j)| f(i, j)).collect()
    }
}
