//! Diffusion maps embedding.
//!
//! The pipeline builds (or accepts) a kernel matrix, optionally keeps only
//! each row's nearest neighbors, normalizes it into the symmetric diffusion
//! operator and scales its leading eigenvectors by their eigenvalues. The
//! resulting coordinates approximately preserve diffusion distances.

use crate::{
    config::DiffusionMapsConfig,
    eigen::{dense_eigen, sparse_eigen, EigenPairs},
    error::{DiffusionError, Result},
    kernel::{find_epsilon, gaussian_kernel, pairwise_distances, sparsify_knn, DiffusionData, KernelMatrix},
    operator::{degree_vector, l_alpha_normalize},
};
use log::{debug, info};
use manifoldkit_core::types::{DMatrix, DVector, Scalar};

/// Output of a diffusion maps run.
#[derive(Debug, Clone)]
pub struct DiffusionEmbedding<T: Scalar> {
    /// `n × n_evecs` diffusion coordinates, column `i` equal to
    /// `eigenvalues[i] · eigenvectors[:, i]`.
    pub coordinates: DMatrix<T>,
    /// Leading eigenvalues, largest magnitude first.
    pub eigenvalues: DVector<T>,
    /// Operator eigenvectors rescaled by `D^-α`, one per column.
    pub eigenvectors: DMatrix<T>,
    /// Bandwidth used when the kernel was built from data.
    pub epsilon: Option<T>,
}

impl<T: Scalar> DiffusionEmbedding<T> {
    /// Number of embedded samples.
    pub fn len(&self) -> usize {
        self.coordinates.nrows()
    }

    /// Whether the embedding is empty.
    pub fn is_empty(&self) -> bool {
        self.coordinates.nrows() == 0
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.coordinates.ncols()
    }
}

/// Diffusion maps embedding.
///
/// # Example
///
/// ```rust
/// use manifoldkit_diffusion::{DiffusionData, DiffusionMaps, DiffusionMapsConfig};
/// use nalgebra::DMatrix;
///
/// let points = DMatrix::from_fn(20, 2, |i, j| {
///     let t = i as f64 * 0.3;
///     if j == 0 { t.cos() } else { t.sin() }
/// });
/// let maps = DiffusionMaps::new(DiffusionMapsConfig::new().with_n_evecs(3)).unwrap();
/// let embedding = maps.fit_data(&DiffusionData::Points(points)).unwrap();
///
/// assert_eq!(embedding.coordinates.shape(), (20, 3));
/// assert!(embedding.epsilon.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DiffusionMaps<T: Scalar> {
    config: DiffusionMapsConfig<T>,
}

impl<T: Scalar> DiffusionMaps<T> {
    /// Creates the embedding after validating `config`.
    pub fn new(config: DiffusionMapsConfig<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &DiffusionMapsConfig<T> {
        &self.config
    }

    /// Embeds a dataset through a Gaussian kernel.
    pub fn fit_data(&self, data: &DiffusionData<T>) -> Result<DiffusionEmbedding<T>> {
        self.mapping(Some(data), None)
    }

    /// Embeds the samples behind a precomputed kernel matrix.
    pub fn fit_kernel(&self, kernel: &DMatrix<T>) -> Result<DiffusionEmbedding<T>> {
        self.mapping(None, Some(kernel))
    }

    /// Runs the full pipeline.
    ///
    /// When both are given, `kernel` is used and `data` only checks that the
    /// sample counts agree.
    ///
    /// # Errors
    ///
    /// - `MissingInput` if neither `data` nor `kernel` is given.
    /// - `NonSquareKernel` if `kernel` is not square.
    /// - `TooManyEigenvectors` if `n_evecs` exceeds the number of samples.
    /// - `InvalidParameter` for a degenerate bandwidth or a zero-degree row.
    pub fn mapping(
        &self,
        data: Option<&DiffusionData<T>>,
        kernel: Option<&DMatrix<T>>,
    ) -> Result<DiffusionEmbedding<T>> {
        let (dense, epsilon) = match (data, kernel) {
            (_, Some(k)) => {
                if k.nrows() != k.ncols() {
                    return Err(DiffusionError::NonSquareKernel {
                        rows: k.nrows(),
                        cols: k.ncols(),
                    });
                }
                if let Some(d) = data {
                    if d.len() != k.nrows() {
                        return Err(DiffusionError::invalid_parameter(format!(
                            "data holds {} samples but the kernel is {}x{}",
                            d.len(),
                            k.nrows(),
                            k.ncols()
                        )));
                    }
                }
                (k.clone(), None)
            }
            (Some(d), None) => {
                let (k, eps) = self.build_kernel(d)?;
                (k, Some(eps))
            }
            (None, None) => return Err(DiffusionError::MissingInput),
        };

        let n = dense.nrows();
        if self.config.n_evecs > n {
            return Err(DiffusionError::TooManyEigenvectors {
                requested: self.config.n_evecs,
                size: n,
            });
        }

        let kernel = match self.config.k_neighbors {
            Some(k) => KernelMatrix::Sparse(sparsify_knn(&dense, k)?.symmetrize_max()?),
            None => KernelMatrix::Dense(dense),
        };
        if let KernelMatrix::Sparse(ref s) = kernel {
            debug!("Sparse kernel with {} stored entries over {} samples", s.nnz(), n);
        }

        let (_, d_inv_alpha) = degree_vector(&kernel, self.config.alpha)?;
        let operator = l_alpha_normalize(&kernel, &d_inv_alpha)?;

        let count = (self.config.n_evecs + 1).min(n);
        let pairs = match operator {
            KernelMatrix::Dense(ref ps) => dense_eigen(ps, count)?,
            KernelMatrix::Sparse(ref ps) => sparse_eigen(
                ps,
                count,
                self.config.eigen_tolerance,
                self.config.max_eigen_iterations,
            )?,
        };

        let embedding = self.embed(pairs, &d_inv_alpha, epsilon);
        info!(
            "Diffusion maps embedded {} samples in {} dimensions (leading eigenvalue {:.6})",
            n,
            embedding.dimension(),
            <T as Scalar>::to_f64(embedding.eigenvalues[0])
        );
        Ok(embedding)
    }

    fn build_kernel(&self, data: &DiffusionData<T>) -> Result<(DMatrix<T>, T)> {
        let distances = pairwise_distances(data)?;
        let epsilon = match self.config.epsilon {
            Some(eps) => eps,
            None => find_epsilon(&distances)?,
        };
        let kernel = gaussian_kernel(&distances, data.len(), epsilon)?;
        Ok((kernel, epsilon))
    }

    fn embed(
        &self,
        pairs: EigenPairs<T>,
        d_inv_alpha: &DVector<T>,
        epsilon: Option<T>,
    ) -> DiffusionEmbedding<T> {
        let n = d_inv_alpha.len();
        let m = self.config.n_evecs;

        let eigenvalues = pairs.values.rows(0, m).clone_owned();
        let eigenvectors = DMatrix::from_fn(n, m, |r, c| d_inv_alpha[r] * pairs.vectors[(r, c)]);
        let coordinates = DMatrix::from_fn(n, m, |r, c| eigenvalues[c] * eigenvectors[(r, c)]);

        DiffusionEmbedding {
            coordinates,
            eigenvalues,
            eigenvectors,
            epsilon,
        }
    }
}
