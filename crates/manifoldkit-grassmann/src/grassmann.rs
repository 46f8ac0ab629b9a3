//! The Grassmann toolkit: a metric, a kernel, an interpolator and an element
//! test bundled behind one configured object.

use crate::{
    element::{ElementTest, SimplexElement},
    interpolation::{validate_inputs, Interpolator, LinearInterpolation},
    karcher::{self, KarcherConfig, KarcherResult},
    kernel::{GrassmannKernel, ProjectionKernel},
    mapping::exp_map_point,
    metric::{GrassmannDistance, GrassmannMetric},
    projection::Ranks,
    registry::StrategyRegistry,
};
use log::debug;
use manifoldkit_core::{
    error::{ManifoldError, Result},
    pairwise::{pair_indices, squareform},
    types::{DMatrix, DVector, Scalar},
};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Grassmann manifold toolkit.
///
/// # Example
///
/// ```rust
/// use manifoldkit_grassmann::{Grassmann, Ranks};
/// use manifoldkit_core::linalg::random_orthonormal;
/// use nalgebra::DMatrix;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let points: Vec<DMatrix<f64>> = (0..3).map(|_| random_orthonormal(10, 3, &mut rng)).collect();
///
/// let grassmann = Grassmann::new();
/// let distances = grassmann.distance(&points, &Ranks::Auto).unwrap();
/// assert_eq!(distances.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Grassmann<T: Scalar> {
    metric: Arc<dyn GrassmannMetric<T>>,
    kernel: Arc<dyn GrassmannKernel<T>>,
    interpolator: Arc<dyn Interpolator<T>>,
    element: Arc<dyn ElementTest<T>>,
}

impl<T: Scalar> Default for Grassmann<T> {
    fn default() -> Self {
        Self {
            metric: Arc::new(GrassmannDistance),
            kernel: Arc::new(ProjectionKernel),
            interpolator: Arc::new(LinearInterpolation::default()),
            element: Arc::new(SimplexElement::default()),
        }
    }
}

impl<T: Scalar> Grassmann<T> {
    /// Toolkit with the geodesic distance, the projection kernel, linear
    /// interpolation and the simplex element test.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toolkit whose strategies are looked up by name in `registry`.
    ///
    /// # Errors
    ///
    /// `UnknownStrategy` if a name is not registered.
    pub fn from_registry(
        registry: &StrategyRegistry<T>,
        metric: &str,
        kernel: &str,
        interpolator: &str,
    ) -> Result<Self> {
        Ok(Self {
            metric: registry.metric(metric)?,
            kernel: registry.kernel(kernel)?,
            interpolator: registry.interpolator(interpolator)?,
            element: Arc::new(SimplexElement::default()),
        })
    }

    /// Replaces the distance metric.
    pub fn with_metric(mut self, metric: Arc<dyn GrassmannMetric<T>>) -> Self {
        self.metric = metric;
        self
    }

    /// Replaces the kernel.
    pub fn with_kernel(mut self, kernel: Arc<dyn GrassmannKernel<T>>) -> Self {
        self.kernel = kernel;
        self
    }

    /// Replaces the interpolator.
    pub fn with_interpolator(mut self, interpolator: Arc<dyn Interpolator<T>>) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Replaces the point-in-element test used by [`Self::exp_mapping_interp`].
    pub fn with_element_test(mut self, element: Arc<dyn ElementTest<T>>) -> Self {
        self.element = element;
        self
    }

    /// Configured metric.
    pub fn metric(&self) -> &dyn GrassmannMetric<T> {
        self.metric.as_ref()
    }

    /// Configured kernel.
    pub fn kernel_fn(&self) -> &dyn GrassmannKernel<T> {
        self.kernel.as_ref()
    }

    /// Configured interpolator.
    pub fn interpolator(&self) -> &dyn Interpolator<T> {
        self.interpolator.as_ref()
    }

    /// Pairwise distances between all points, in lexicographic pair order.
    ///
    /// Each point is first truncated to the leading columns given by its rank.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for fewer than two points.
    /// - `InvalidRank` from rank resolution.
    /// - Any error of the metric.
    pub fn distance(&self, points: &[DMatrix<T>], ranks: &Ranks) -> Result<Vec<T>> {
        let truncated = truncate_to_ranks(points, ranks)?;
        debug!(
            "evaluating {} on {} points",
            self.metric.name(),
            truncated.len()
        );
        evaluate_pairs(truncated.len(), |i, j| {
            self.metric.compute(&truncated[i], &truncated[j])
        })
    }

    /// Kernel matrix over all points.
    ///
    /// Off-diagonal entries come from the pairwise kernel, the diagonal from
    /// each truncated point against itself.
    pub fn kernel(&self, points: &[DMatrix<T>], ranks: &Ranks) -> Result<DMatrix<T>> {
        let truncated = truncate_to_ranks(points, ranks)?;
        debug!(
            "evaluating {} on {} points",
            self.kernel.name(),
            truncated.len()
        );
        let off_diagonal = evaluate_pairs(truncated.len(), |i, j| {
            self.kernel.compute(&truncated[i], &truncated[j])
        })?;
        let diagonal = truncated
            .iter()
            .map(|x| self.kernel.compute(x, x))
            .collect::<Result<Vec<T>>>()?;
        squareform(&off_diagonal, &diagonal)
    }

    /// Mean squared distance from `candidate` to `points` under the
    /// configured metric.
    pub fn frechet_variance(&self, candidate: &DMatrix<T>, points: &[DMatrix<T>]) -> Result<T> {
        karcher::frechet_variance(candidate, points, self.metric.as_ref())
    }

    /// Karcher mean of `points`, started from the Fréchet-variance minimizer
    /// under the configured metric.
    pub fn karcher_mean(
        &self,
        points: &[DMatrix<T>],
        config: &KarcherConfig<T>,
    ) -> Result<KarcherResult<T>> {
        karcher::karcher_mean(points, self.metric.as_ref(), config)
    }

    /// Entry-wise interpolation of `samples` (one per node) at `query`.
    ///
    /// # Errors
    ///
    /// Shape errors from [`validate_inputs`] and any error of the
    /// interpolator.
    pub fn interpolate_sample(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
    ) -> Result<DMatrix<T>> {
        validate_inputs(nodes, samples, query)?;
        self.interpolator.interpolate(nodes, samples, query)
    }

    /// Interpolates tangent-space samples at `query` and maps the result to
    /// the manifold at `reference`.
    ///
    /// # Errors
    ///
    /// - `OutsideElement` if `query` is not inside the element spanned by
    ///   `nodes`.
    /// - `DimensionMismatch` if the samples do not have the reference's shape.
    /// - Errors of [`Self::interpolate_sample`].
    pub fn exp_mapping_interp(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
        reference: &DMatrix<T>,
    ) -> Result<DMatrix<T>> {
        validate_inputs(nodes, samples, query)?;
        if !self.element.contains(query, nodes)? {
            return Err(ManifoldError::outside_element(
                "the query point must lie within the element",
            ));
        }
        let interpolated = self.interpolator.interpolate(nodes, samples, query)?;
        exp_map_point(&interpolated, reference)
    }
}

/// Truncates every point to the leading columns given by its rank.
fn truncate_to_ranks<T: Scalar>(points: &[DMatrix<T>], ranks: &Ranks) -> Result<Vec<DMatrix<T>>> {
    if points.len() < 2 {
        return Err(ManifoldError::invalid_parameter(format!(
            "at least 2 points are required, got {}",
            points.len()
        )));
    }
    let ranks = ranks.resolve(points)?;
    Ok(points
        .iter()
        .zip(&ranks)
        .map(|(p, &r)| p.columns(0, r).clone_owned())
        .collect())
}

/// Evaluates `f` on every pair `(i, j)`, `i < j`, in lexicographic order.
fn evaluate_pairs<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Scalar,
    F: Fn(usize, usize) -> Result<T> + Send + Sync,
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
