//! # manifoldkit
//!
//! Geometry-aware tools for uncertainty quantification on high-dimensional
//! responses:
//!
//! - [`grassmann`]: distances, kernels, tangent maps, Karcher means and
//!   interpolation for subspaces on the Grassmann manifold,
//! - [`diffusion`]: diffusion maps embedding of point clouds, matrix-valued
//!   samples or precomputed kernels,
//! - [`core`]: the scalar bound, errors and linear-algebra primitives both
//!   build on.
//!
//! ## Example
//!
//! ```rust
//! use manifoldkit::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let points: Vec<DMatrix<f64>> = (0..6).map(|_| random_orthonormal(8, 2, &mut rng)).collect();
//!
//! let grassmann = Grassmann::new();
//! let kernel = grassmann.kernel(&points, &Ranks::Auto).unwrap();
//!
//! let maps = DiffusionMaps::new(DiffusionMapsConfig::new().with_n_evecs(2)).unwrap();
//! let embedding = maps.fit_kernel(&kernel).unwrap();
//! assert_eq!(embedding.coordinates.shape(), (6, 2));
//! ```

pub use manifoldkit_core as core;
pub use manifoldkit_diffusion as diffusion;
pub use manifoldkit_grassmann as grassmann;

pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use manifoldkit_core::prelude::*;
    pub use manifoldkit_diffusion::{
        DiffusionData, DiffusionEmbedding, DiffusionError, DiffusionMaps, DiffusionMapsConfig,
    };
    pub use manifoldkit_grassmann::{
        exp_map, log_map, project_points, ChordalDistance, Grassmann, GrassmannDistance,
        GrassmannKernel, GrassmannMetric, KarcherConfig, KarcherResult, ProcrustesDistance,
        ProjectionDistance, ProjectionKernel, Ranks, StrategyRegistry, TerminationReason,
    };
}
