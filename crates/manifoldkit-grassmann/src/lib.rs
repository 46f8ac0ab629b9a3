//! Manifold toolkit for the Grassmann manifold Gr(n, p).
//!
//! Points are represented by `n × p` matrices with orthonormal columns. The
//! crate provides:
//!
//! - pairwise [distances](metric) and [kernels](kernel) between subspaces,
//! - [projection](projection) of raw matrices onto the manifold,
//! - logarithmic and exponential [maps](mapping) at a reference point,
//! - [Karcher mean](karcher) estimation by batch or stochastic descent,
//! - entry-wise [interpolation](interpolation) of matrix-valued samples over
//!   a spatial element, with re-projection onto the manifold.
//!
//! Strategies are trait objects; a [`StrategyRegistry`] resolves them by name
//! and accepts caller-supplied implementations next to the built-ins.

pub mod element;
pub mod grassmann;
pub mod interpolation;
pub mod karcher;
pub mod kernel;
pub mod mapping;
pub mod metric;
pub mod projection;
pub mod registry;
pub mod surrogate;

pub use element::{barycentric_coordinates, ElementTest, PolygonElement, SimplexElement};
pub use grassmann::Grassmann;
pub use interpolation::{
    validate_inputs, Interpolator, InterpolatorFn, KrigingInterpolation, LinearInterpolation,
};
pub use karcher::{
    frechet_variance, karcher_mean, KarcherConfig, KarcherMethod, KarcherResult, TerminationReason,
};
pub use kernel::{BinetCauchyKernel, GrassmannKernel, KernelFn, ProjectionKernel};
pub use mapping::{exp_map, exp_map_point, log_map, log_map_point};
pub use metric::{
    principal_angles, ChordalDistance, GrassmannDistance, GrassmannMetric, MetricFn,
    ProcrustesDistance, ProjectionDistance,
};
pub use projection::{project_points, ProjectedPoints, Ranks};
pub use registry::StrategyRegistry;
pub use surrogate::{
    CorrelationModel, KrigingConfig, Prediction, RegressionModel, Surrogate, SurrogateFactory,
};
