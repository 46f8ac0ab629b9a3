//! Core types and primitives for manifoldkit.
//!
//! This crate holds what the Grassmann toolkit and the diffusion embedding
//! share: the [`Scalar`](types::Scalar) bound, the error type, the dense
//! linear-algebra primitives (truncated SVD, numerical rank, QR
//! re-orthonormalization), a CSR sparse matrix and the pair-enumeration
//! helpers that fix the layout of every pairwise result.
//!
//! # Modules
//!
//! - [`error`]: Error types for manifold operations
//! - [`linalg`]: SVD, rank and orthonormality primitives
//! - [`pairwise`]: Pair enumeration and condensed/square conversion
//! - [`sparse`]: CSR/COO sparse matrices
//! - [`types`]: Scalar trait and type aliases

pub mod error;
pub mod linalg;
pub mod pairwise;
pub mod sparse;
pub mod types;

pub use error::{ManifoldError, Result};
pub use types::{DMatrix, DVector, Scalar};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ManifoldError, Result};
    pub use crate::linalg::{
        allclose, is_orthonormal, numerical_rank, orthonormalize, random_orthonormal, thin_svd,
        truncated_svd, Svd,
    };
    pub use crate::pairwise::{pair_count, pair_indices, squareform};
    pub use crate::sparse::{CooMatrix, CsrMatrix};
    pub use crate::types::{constants, DMatrix, DVector, Scalar};
}
