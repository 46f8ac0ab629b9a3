//! Sparse matrix support for kernel graphs.
//!
//! A k-nearest-neighbor kernel keeps only a handful of entries per row, so
//! the diffusion operator built from it is stored in compressed sparse row
//! form and only ever touched through products with dense blocks.

use crate::{
    error::{ManifoldError as Error, Result},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;

/// Compressed Sparse Row (CSR) format matrix.
///
/// Column indices within each row are kept sorted in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T: Scalar> {
    /// Number of rows
    nrows: usize,
    /// Number of columns
    ncols: usize,
    /// Row pointers (length nrows + 1)
    row_ptr: Vec<usize>,
    /// Column indices (length nnz)
    col_idx: Vec<usize>,
    /// Non-zero values (length nnz)
    values: Vec<T>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Creates a new CSR matrix from raw data.
    pub fn new(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        if row_ptr.len() != nrows + 1 {
            return Err(Error::DimensionMismatch {
                expected: format!("row_ptr length {}", nrows + 1),
                actual: format!("row_ptr length {}", row_ptr.len()),
            });
        }

        let nnz = row_ptr[nrows];
        if col_idx.len() != nnz {
            return Err(Error::DimensionMismatch {
                expected: format!("col_idx length {}", nnz),
                actual: format!("col_idx length {}", col_idx.len()),
            });
        }

        if values.len() != nnz {
            return Err(Error::DimensionMismatch {
                expected: format!("values length {}", nnz),
                actual: format!("values length {}", values.len()),
            });
        }

        if let Some(&j) = col_idx.iter().find(|&&j| j >= ncols) {
            return Err(Error::DimensionMismatch {
                expected: format!("column index < {}", ncols),
                actual: format!("column index {}", j),
            });
        }

        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Creates a CSR matrix from a dense matrix, dropping entries with
    /// magnitude at or below `tolerance`.
    pub fn from_dense(dense: &DMatrix<T>, tolerance: T) -> Self {
        let mut row_ptr = Vec::with_capacity(dense.nrows() + 1);
        row_ptr.push(0);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();

        for i in 0..dense.nrows() {
            for j in 0..dense.ncols() {
                let val = dense[(i, j)];
                if <T as Float>::abs(val) > tolerance {
                    col_idx.push(j);
                    values.push(val);
                }
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            nrows: dense.nrows(),
            ncols: dense.ncols(),
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Converts to a dense matrix.
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut dense = DMatrix::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            for (j, v) in self.row(i) {
                dense[(i, j)] = v;
            }
        }
        dense
    }

    /// Returns the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the number of stored elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterates over `(column, value)` pairs stored in row `i`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Number of stored elements in row `i`.
    #[inline]
    pub fn row_nnz(&self, i: usize) -> usize {
        self.row_ptr[i + 1] - self.row_ptr[i]
    }

    /// Sum of every row.
    pub fn row_sums(&self) -> DVector<T> {
        DVector::from_fn(self.nrows, |i, _| {
            self.row(i).fold(T::zero(), |acc, (_, v)| acc + v)
        })
    }

    /// Sparse-dense product `A * B` for a block of column vectors.
    pub fn mul_dense(&self, b: &DMatrix<T>) -> Result<DMatrix<T>> {
        if b.nrows() != self.ncols {
            return Err(Error::dimension_mismatch(
                format!("block with {} rows", self.ncols),
                format!("block with {} rows", b.nrows()),
            ));
        }

        let mut out = DMatrix::zeros(self.nrows, b.ncols());
        for i in 0..self.nrows {
            for (j, v) in self.row(i) {
                for c in 0..b.ncols() {
                    out[(i, c)] = out[(i, c)] + v * b[(j, c)];
                }
            }
        }
        Ok(out)
    }

    /// Returns `diag(d) · A · diag(d)` without materializing the diagonals.
    pub fn scale_symmetric(&self, d: &DVector<T>) -> Result<Self> {
        if d.len() != self.nrows || d.len() != self.ncols {
            return Err(Error::dimension_mismatch(
                format!("scaling vector of length {}", self.nrows),
                format!("length {}", d.len()),
            ));
        }

        let mut values = self.values.clone();
        for i in 0..self.nrows {
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                values[k] = d[i] * values[k] * d[self.col_idx[k]];
            }
        }

        Ok(Self {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr: self.row_ptr.clone(),
            col_idx: self.col_idx.clone(),
            values,
        })
    }

    /// Transpose of the sparse matrix.
    pub fn transpose(&self) -> Self {
        let mut col_counts = vec![0; self.ncols];
        for &j in &self.col_idx {
            col_counts[j] += 1;
        }

        let mut t_row_ptr = vec![0; self.ncols + 1];
        for j in 0..self.ncols {
            t_row_ptr[j + 1] = t_row_ptr[j] + col_counts[j];
        }

        let mut t_col_idx = vec![0; self.nnz()];
        let mut t_values = vec![T::zero(); self.nnz()];
        let mut col_positions = t_row_ptr[..self.ncols].to_vec();

        for i in 0..self.nrows {
            for (j, v) in self.row(i) {
                let pos = col_positions[j];
                t_col_idx[pos] = i;
                t_values[pos] = v;
                col_positions[j] += 1;
            }
        }

        Self {
            nrows: self.ncols,
            ncols: self.nrows,
            row_ptr: t_row_ptr,
            col_idx: t_col_idx,
            values: t_values,
        }
    }

    /// Symmetrizes a square matrix by taking `max(A_ij, A_ji)` entry-wise.
    ///
    /// This is the usual "i is a neighbor of j or j is a neighbor of i"
    /// closure of a k-nearest-neighbor graph.
    pub fn symmetrize_max(&self) -> Result<Self> {
        if self.nrows != self.ncols {
            return Err(Error::dimension_mismatch(
                "square matrix",
                format!("{}x{}", self.nrows, self.ncols),
            ));
        }

        let t = self.transpose();
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        row_ptr.push(0);
        let mut col_idx = Vec::with_capacity(self.nnz() * 2);
        let mut values = Vec::with_capacity(self.nnz() * 2);

        for i in 0..self.nrows {
            let mut a = self.row(i).peekable();
            let mut b = t.row(i).peekable();
            loop {
                let next = match (a.peek().copied(), b.peek().copied()) {
                    (Some((ja, va)), Some((jb, vb))) => {
                        if ja == jb {
                            a.next();
                            b.next();
                            (ja, <T as Float>::max(va, vb))
                        } else if ja < jb {
                            a.next();
                            (ja, va)
                        } else {
                            b.next();
                            (jb, vb)
                        }
                    }
                    (Some(entry), None) => {
                        a.next();
                        entry
                    }
                    (None, Some(entry)) => {
                        b.next();
                        entry
                    }
                    (None, None) => break,
                };
                col_idx.push(next.0);
                values.push(next.1);
            }
            row_ptr.push(col_idx.len());
        }

        Ok(Self {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr,
            col_idx,
            values,
        })
    }
}

/// Coordinate (COO) format matrix for easier construction.
#[derive(Debug, Clone)]
pub struct CooMatrix<T: Scalar> {
    /// Number of rows
    nrows: usize,
    /// Number of columns
    ncols: usize,
    /// Triplets (row, col, value)
    triplets: Vec<(usize, usize, T)>,
}

impl<T: Scalar> CooMatrix<T> {
    /// Creates a new empty COO matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            triplets: Vec::new(),
        }
    }

    /// Creates an empty COO matrix with room for `capacity` entries.
    pub fn with_capacity(nrows: usize, ncols: usize, capacity: usize) -> Self {
        Self {
            nrows,
            ncols,
            triplets: Vec::with_capacity(capacity),
        }
    }

    /// Adds an entry to the matrix. Exact zeros are not stored.
    pub fn push(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.nrows {
            return Err(Error::DimensionMismatch {
                expected: format!("row < {}", self.nrows),
                actual: format!("row = {}", row),
            });
        }

        if col >= self.ncols {
            return Err(Error::DimensionMismatch {
                expected: format!("col < {}", self.ncols),
                actual: format!("col = {}", col),
            });
        }

        if value != T::zero() {
            self.triplets.push((row, col, value));
        }

        Ok(())
    }

    /// Converts to CSR format, summing duplicate entries.
    pub fn to_csr(&self) -> CsrMatrix<T> {
        let mut sorted_triplets = self.triplets.clone();
        sorted_triplets.sort_by_key(|&(r, c, _)| (r, c));

        let mut unique_triplets: Vec<(usize, usize, T)> = Vec::with_capacity(sorted_triplets.len());
        for (r, c, v) in sorted_triplets {
            if let Some(last) = unique_triplets.last_mut() {
                if last.0 == r && last.1 == c {
                    last.2 = last.2 + v;
                    continue;
                }
            }
            unique_triplets.push((r, c, v));
        }

        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        row_ptr.push(0);
        let mut col_idx = Vec::with_capacity(unique_triplets.len());
        let mut values = Vec::with_capacity(unique_triplets.len());

        let mut current_row = 0;
        for (r, c, v) in unique_triplets {
            while current_row < r {
                row_ptr.push(col_idx.len());
                current_row += 1;
            }
            col_idx.push(c);
            values.push(v);
        }

        while current_row < self.nrows {
            row_ptr.push(col_idx.len());
            current_row += 1;
        }

        CsrMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr,
            col_idx,
            values,
        }
    }
}
