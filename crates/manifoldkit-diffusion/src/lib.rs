//! Diffusion maps embedding.
//!
//! Builds a Gaussian kernel over a point cloud or a set of matrices (or
//! accepts a precomputed one), optionally sparsifies it to a
//! k-nearest-neighbor graph, forms the alpha-normalized diffusion operator
//! and returns its leading eigenpairs as low-dimensional coordinates.
//!
//! Every stage is a public function so it can be run on its own:
//! [`pairwise_distances`], [`find_epsilon`], [`gaussian_kernel`],
//! [`sparsify_knn`], [`degree_vector`], [`l_alpha_normalize`],
//! [`dense_eigen`] and [`sparse_eigen`].

pub mod config;
pub mod diffusion_maps;
pub mod eigen;
pub mod error;
pub mod kernel;
pub mod operator;

pub use config::DiffusionMapsConfig;
pub use diffusion_maps::{DiffusionEmbedding, DiffusionMaps};
pub use eigen::{dense_eigen, sparse_eigen, EigenPairs};
pub use error::{DiffusionError, Result};
pub use kernel::{
    find_epsilon, gaussian_kernel, pairwise_distances, sparsify_knn, DiffusionData, KernelMatrix,
};
pub use operator::{degree_vector, l_alpha_normalize};
