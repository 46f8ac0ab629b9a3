//! Pair enumeration and condensed ↔ square layout conversion.
//!
//! Pairwise quantities are stored in condensed form: one entry per unordered
//! pair `(i, j)` with `i < j`, in lexicographic order
//! `(0,1), (0,2), …, (0,n-1), (1,2), …`.

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, Scalar},
};

/// Number of unordered pairs among `n` items.
#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// All unordered index pairs `(i, j)`, `i < j`, in lexicographic order.
pub fn pair_indices(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(pair_count(n));
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Expands condensed pair values into a symmetric `n × n` matrix with `diagonal`.
///
/// # Errors
///
/// `DimensionMismatch` when `condensed` does not hold `n(n-1)/2` values or the
/// diagonal does not hold `n` values.
pub fn squareform<T: Scalar>(condensed: &[T], diagonal: &[T]) -> Result<DMatrix<T>> {
    let n = diagonal.len();
    if condensed.len() != pair_count(n) {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} pair values for {} items", pair_count(n), n),
            format!("{} pair values", condensed.len()),
        ));
    }

    let mut square = DMatrix::from_diagonal(&nalgebra::DVector::from_column_slice(diagonal));
    for (k, (i, j)) in pair_indices(n).into_iter().enumerate() {
        square[(i, j)] = condensed[k];
        square[(j, i)] = condensed[k];
    }
    Ok(square)
}
