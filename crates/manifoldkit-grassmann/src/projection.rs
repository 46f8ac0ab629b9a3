//! Projection of raw matrices onto the Grassmann manifold.
//!
//! A raw `n × m` matrix is mapped to the subspace spanned by its leading left
//! singular vectors. When several matrices are projected together they are
//! all truncated to the largest of their ranks so the representatives share
//! one shape.

use manifoldkit_core::{
    error::{ManifoldError, Result},
    linalg::{numerical_rank, truncated_svd},
    types::{DMatrix, Scalar},
};

/// How the rank of each input matrix is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ranks {
    /// Numerical rank of every matrix.
    #[default]
    Auto,
    /// One rank per matrix, in input order.
    Explicit(Vec<usize>),
}

impl From<Vec<usize>> for Ranks {
    fn from(ranks: Vec<usize>) -> Self {
        Ranks::Explicit(ranks)
    }
}

impl From<&[usize]> for Ranks {
    fn from(ranks: &[usize]) -> Self {
        Ranks::Explicit(ranks.to_vec())
    }
}

impl Ranks {
    /// Resolves one rank per matrix.
    ///
    /// # Errors
    ///
    /// `InvalidRank` when an explicit list has the wrong length, contains a
    /// zero, or exceeds a matrix's column count, and when an automatically
    /// estimated rank is zero (an all-zero matrix spans no subspace).
    pub fn resolve<T: Scalar>(&self, matrices: &[DMatrix<T>]) -> Result<Vec<usize>> {
        match self {
            Ranks::Auto => matrices
                .iter()
                .enumerate()
                .map(|(i, m)| match numerical_rank(m) {
                    0 => Err(ManifoldError::invalid_rank(format!(
                        "matrix {} has numerical rank 0",
                        i
                    ))),
                    r => Ok(r),
                })
                .collect(),
            Ranks::Explicit(ranks) => {
                if ranks.len() != matrices.len() {
                    return Err(ManifoldError::invalid_rank(format!(
                        "expected {} ranks, got {}",
                        matrices.len(),
                        ranks.len()
                    )));
                }
                for (i, (&r, m)) in ranks.iter().zip(matrices).enumerate() {
                    if r == 0 || r > m.ncols() {
                        return Err(ManifoldError::invalid_rank(format!(
                            "rank {} for matrix {} must be in 1..={}",
                            r,
                            i,
                            m.ncols()
                        )));
                    }
                }
                Ok(ranks.clone())
            }
        }
    }
}

/// Result of [`project_points`].
#[derive(Debug, Clone)]
pub struct ProjectedPoints<T: Scalar> {
    /// Left singular vectors: the subspace representatives, `n × max_rank`.
    pub psi: Vec<DMatrix<T>>,
    /// Singular values as `max_rank × max_rank` diagonal matrices.
    pub sigma: Vec<DMatrix<T>>,
    /// Right singular vectors, `m × max_rank`.
    pub phi: Vec<DMatrix<T>>,
    /// Largest of the per-matrix ranks.
    pub max_rank: usize,
    /// Per-matrix ranks used.
    pub ranks: Vec<usize>,
}

/// Projects every matrix onto the Grassmann manifold via truncated SVD.
///
/// # Errors
///
/// - `InvalidParameter` if `matrices` is empty.
/// - `InvalidRank` from [`Ranks::resolve`], or when the common rank exceeds
///   the smaller dimension of one of the matrices.
pub fn project_points<T: Scalar>(
    matrices: &[DMatrix<T>],
    ranks: &Ranks,
) -> Result<ProjectedPoints<T>> {
    if matrices.is_empty() {
        return Err(ManifoldError::invalid_parameter(
            "at least one matrix is required",
        ));
    }

    let ranks = ranks.resolve(matrices)?;
    let max_rank = ranks.iter().copied().max().unwrap_or(0);

    let mut psi = Vec::with_capacity(matrices.len());
    let mut sigma = Vec::with_capacity(matrices.len());
    let mut phi = Vec::with_capacity(matrices.len());
    for m in matrices {
        let svd = truncated_svd(m, max_rank)?;
        sigma.push(svd.sigma());
        phi.push(svd.v());
        psi.push(svd.u);
    }

    Ok(ProjectedPoints {
        psi,
        sigma,
        phi,
        max_rank,
        ranks,
    })
}
