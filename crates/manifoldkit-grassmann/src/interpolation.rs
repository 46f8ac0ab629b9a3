//! Entry-wise interpolation of matrix-valued samples over spatial nodes.
//!
//! Every interpolator receives `N` node coordinates, one sample matrix per
//! node (all of the same shape) and a query coordinate, and returns a matrix
//! of the sample shape. The built-ins treat each matrix entry as an
//! independent scalar field.

use crate::{
    element::barycentric_coordinates,
    surrogate::{KrigingConfig, SurrogateFactory},
};
use log::debug;
use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, Scalar},
};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};

/// Minimum number of node samples accepted by the toolkit.
pub const MIN_SAMPLES: usize = 3;

/// Interpolates matrix-valued samples at a query coordinate.
pub trait Interpolator<T: Scalar>: Send + Sync + Debug {
    /// Name under which the interpolator is registered.
    fn name(&self) -> &str;

    /// Interpolated matrix at `query`.
    fn interpolate(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
    ) -> Result<DMatrix<T>>;
}

/// Checks the shapes shared by every interpolation call.
///
/// # Errors
///
/// - `InvalidParameter` for fewer than [`MIN_SAMPLES`] samples.
/// - `DimensionMismatch` if the samples differ in shape, the node count
///   differs from the sample count, or a node's dimension differs from the
///   query's.
pub fn validate_inputs<T: Scalar>(
    nodes: &[DVector<T>],
    samples: &[DMatrix<T>],
    query: &DVector<T>,
) -> Result<()> {
    if samples.len() < MIN_SAMPLES {
        return Err(ManifoldError::invalid_parameter(format!(
            "at least {} samples are required, got {}",
            MIN_SAMPLES,
            samples.len()
        )));
    }
    let shape = samples[0].shape();
    if let Some(bad) = samples.iter().find(|s| s.shape() != shape) {
        return Err(ManifoldError::dimension_mismatch(
            format!("{}x{}", shape.0, shape.1),
            format!("{}x{}", bad.nrows(), bad.ncols()),
        ));
    }
    if nodes.len() != samples.len() {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} nodes", samples.len()),
            format!("{} nodes", nodes.len()),
        ));
    }
    if let Some(bad) = nodes.iter().find(|n| n.len() != query.len()) {
        return Err(ManifoldError::dimension_mismatch(
            format!("nodes of dimension {}", query.len()),
            format!("node of dimension {}", bad.len()),
        ));
    }
    Ok(())
}

fn weighted_sum<T: Scalar>(samples: &[DMatrix<T>], weights: &[(usize, T)]) -> DMatrix<T> {
    let (nrows, ncols) = samples[0].shape();
    let mut out = DMatrix::zeros(nrows, ncols);
    for &(i, w) in weights {
        out = out + &samples[i] * w;
    }
    out
}

/// Piecewise-linear interpolation.
///
/// In one dimension the nodes may be any set of distinct coordinates; the
/// query is located between its two neighbors. In `d > 1` dimensions the
/// query is located in the Delaunay triangulation of the nodes and the
/// barycentric weights of the containing simplex are used. Node sets with
/// co-spherical vertices (a square, say) have several valid triangulations;
/// the first simplex in lexicographic node order wins.
#[derive(Debug, Clone, Copy)]
pub struct LinearInterpolation {
    /// Barycentric weights down to `-tolerance` count as inside.
    pub tolerance: f64,
}

impl Default for LinearInterpolation {
    fn default() -> Self {
        Self { tolerance: 1e-10 }
    }
}

impl LinearInterpolation {
    /// Creates a linear interpolator with the default boundary tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    fn weights_1d<T: Scalar>(&self, nodes: &[DVector<T>], query: T) -> Result<Vec<(usize, T)>> {
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| {
            nodes[a][0]
                .partial_cmp(&nodes[b][0])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for pair in order.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let (x0, x1) = (nodes[lo][0], nodes[hi][0]);
            if query == x0 {
                return Ok(vec![(lo, T::one())]);
            }
            if query == x1 {
                return Ok(vec![(hi, T::one())]);
            }
            if x0 < query && query < x1 {
                let t = (query - x0) / (x1 - x0);
                return Ok(vec![(lo, T::one() - t), (hi, t)]);
            }
        }
        Err(ManifoldError::outside_element(format!(
            "query {} lies outside the node range",
            query
        )))
    }

    fn weights_simplex<T: Scalar>(
        &self,
        nodes: &[DVector<T>],
        query: &DVector<T>,
    ) -> Result<Vec<(usize, T)>> {
        let d = query.len();
        if nodes.len() < d + 1 {
            return Err(ManifoldError::invalid_parameter(format!(
                "linear interpolation in {} dimensions needs at least {} nodes, got {}",
                d,
                d + 1,
                nodes.len()
            )));
        }
        let tol = <T as Scalar>::from_f64(self.tolerance);
        let mut found_simplex = false;
        let mut subset: Vec<usize> = (0..=d).collect();

        loop {
            let vertices: Vec<DVector<T>> = subset.iter().map(|&i| nodes[i].clone()).collect();
            // Degenerate subsets span no volume and have no circumsphere.
            if let Some((center, radius_sq)) = circumsphere(&vertices) {
                found_simplex = true;
                if let Ok(weights) = barycentric_coordinates(query, &vertices) {
                    if weights.iter().all(|&w| w >= -tol)
                        && is_delaunay(nodes, &subset, &center, radius_sq, tol)
                    {
                        debug!("query located in simplex {:?}", subset);
                        return Ok(subset.iter().copied().zip(weights.iter().copied()).collect());
                    }
                }
            }
            if !next_combination(&mut subset, nodes.len()) {
                break;
            }
        }

        if !found_simplex {
            return Err(ManifoldError::invalid_parameter(format!(
                "nodes span no {}-dimensional simplex",
                d
            )));
        }
        Err(ManifoldError::outside_element(
            "query lies outside the convex hull of the nodes",
        ))
    }
}

/// Center and squared radius of the sphere through the `d + 1` vertices, or
/// `None` if they are affinely dependent.
fn circumsphere<T: Scalar>(vertices: &[DVector<T>]) -> Option<(DVector<T>, T)> {
    let d = vertices.len() - 1;
    let p0 = &vertices[0];
    let two = <T as Scalar>::from_f64(2.0);
    let a = DMatrix::from_fn(d, d, |i, j| two * (vertices[i + 1][j] - p0[j]));
    let b = DVector::from_fn(d, |i, _| vertices[i + 1].norm_squared() - p0.norm_squared());
    let center = a.lu().solve(&b)?;
    let radius_sq = (p0 - &center).norm_squared();
    Some((center, radius_sq))
}

/// Empty-circumsphere test: no other node lies strictly inside the sphere.
fn is_delaunay<T: Scalar>(
    nodes: &[DVector<T>],
    subset: &[usize],
    center: &DVector<T>,
    radius_sq: T,
    tol: T,
) -> bool {
    let limit = radius_sq * (T::one() - tol);
    nodes
        .iter()
        .enumerate()
        .filter(|(i, _)| !subset.contains(i))
        .all(|(_, m)| (m - center).norm_squared() >= limit)
}

/// Advances `subset` to the next k-combination of `0..n` in lexicographic
/// order. Returns `false` after the last one.
fn next_combination(subset: &mut [usize], n: usize) -> bool {
    let k = subset.len();
    for pos in (0..k).rev() {
        if subset[pos] < n - k + pos {
            subset[pos] += 1;
            for next in pos + 1..k {
                subset[next] = subset[next - 1] + 1;
            }
            return true;
        }
    }
    false
}

impl<T: Scalar> Interpolator<T> for LinearInterpolation {
    fn name(&self) -> &str {
        "linear_interp"
    }

    fn interpolate(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
    ) -> Result<DMatrix<T>> {
        validate_inputs(nodes, samples, query)?;
        let weights = match query.len() {
            0 => {
                return Err(ManifoldError::invalid_parameter(
                    "query must have at least one coordinate",
                ))
            }
            1 => self.weights_1d(nodes, query[0])?,
            _ => self.weights_simplex(nodes, query)?,
        };
        Ok(weighted_sum(samples, &weights))
    }
}

/// Kriging interpolation through an external regression surrogate.
///
/// One surrogate is fitted per matrix entry. Entries whose node values are
/// all equal are returned directly without fitting.
pub struct KrigingInterpolation<T: Scalar> {
    factory: Arc<dyn SurrogateFactory<T>>,
    config: KrigingConfig,
}

impl<T: Scalar> KrigingInterpolation<T> {
    /// Creates a kriging interpolator.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `config` fails validation.
    pub fn new(factory: Arc<dyn SurrogateFactory<T>>, config: KrigingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { factory, config })
    }

    /// Configuration handed to the surrogate factory.
    pub fn config(&self) -> &KrigingConfig {
        &self.config
    }
}

impl<T: Scalar> Debug for KrigingInterpolation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrigingInterpolation")
            .field("factory", &self.factory)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Scalar> Interpolator<T> for KrigingInterpolation<T> {
    fn name(&self) -> &str {
        "kriging_interp"
    }

    fn interpolate(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
    ) -> Result<DMatrix<T>> {
        validate_inputs(nodes, samples, query)?;
        let (nrows, ncols) = samples[0].shape();
        let mut out = DMatrix::zeros(nrows, ncols);
        let mut values = vec![T::zero(); samples.len()];
        let mut fitted = 0usize;

        for j in 0..ncols {
            for i in 0..nrows {
                for (slot, s) in values.iter_mut().zip(samples) {
                    *slot = s[(i, j)];
                }
                let first = values[0];
                out[(i, j)] = if values.iter().all(|&v| v == first) {
                    first
                } else {
                    fitted += 1;
                    self.factory
                        .fit(nodes, &values, &self.config)?
                        .predict(query, false)?
                        .value
                };
            }
        }
        debug!(
            "kriging interpolation fitted {} of {} entries",
            fitted,
            nrows * ncols
        );
        Ok(out)
    }
}

/// Adapter turning a closure into a named [`Interpolator`].
pub struct InterpolatorFn<F> {
    name: String,
    f: F,
}

impl<F> InterpolatorFn<F> {
    /// Wraps `f` under `name`.
    pub fn new<S: Into<String>>(name: S, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for InterpolatorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterpolatorFn({})", self.name)
    }
}

impl<T, F> Interpolator<T> for InterpolatorFn<F>
where
    T: Scalar,
    F: Fn(&[DVector<T>], &[DMatrix<T>], &DVector<T>) -> Result<DMatrix<T>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interpolate(
        &self,
        nodes: &[DVector<T>],
        samples: &[DMatrix<T>],
        query: &DVector<T>,
    ) -> Result<DMatrix<T>> {
        (self.f)(nodes, samples, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogate::{Prediction, Surrogate};
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn v(coords: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(coords)
    }

    fn constant(value: f64) -> DMatrix<f64> {
        DMatrix::from_element(2, 2, value)
    }

    #[test]
    fn test_linear_1d_unsorted_nodes() {
        let nodes = vec![v(&[2.0]), v(&[0.0]), v(&[1.0])];
        let samples = vec![constant(4.0), constant(0.0), constant(1.0)];
        let out = LinearInterpolation::new()
            .interpolate(&nodes, &samples, &v(&[1.5]))
            .unwrap();
        assert_relative_eq!(out, constant(2.5), epsilon = 1e-12);
        // Exactly on a node.
        let out = LinearInterpolation::new()
            .interpolate(&nodes, &samples, &v(&[2.0]))
            .unwrap();
        assert_relative_eq!(out, constant(4.0));
    }

    #[test]
    fn test_linear_on_triangle_reproduces_affine_field() {
        let nodes = vec![v(&[0.0, 0.0]), v(&[1.0, 0.0]), v(&[0.0, 1.0])];
        // f(x, y) = 1 + 2x + 3y entry-wise scaled.
        let f = |x: f64, y: f64| {
            DMatrix::from_row_slice(2, 2, &[1.0 + 2.0 * x + 3.0 * y, x, y, -x - y])
        };
        let samples: Vec<_> = nodes.iter().map(|n| f(n[0], n[1])).collect();
        let out = LinearInterpolation::new()
            .interpolate(&nodes, &samples, &v(&[0.2, 0.3]))
            .unwrap();
        assert_relative_eq!(out, f(0.2, 0.3), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_outside_is_error() {
        let nodes = vec![v(&[0.0]), v(&[1.0]), v(&[2.0])];
        let samples = vec![constant(0.0), constant(1.0), constant(2.0)];
        assert!(matches!(
            LinearInterpolation::new().interpolate(&nodes, &samples, &v(&[2.5])),
            Err(ManifoldError::OutsideElement { .. })
        ));

        let tri = vec![v(&[0.0, 0.0]), v(&[1.0, 0.0]), v(&[0.0, 1.0])];
        assert!(matches!(
            LinearInterpolation::new().interpolate(&tri, &samples, &v(&[1.0, 1.0])),
            Err(ManifoldError::OutsideElement { .. })
        ));
    }

    #[test]
    fn test_linear_on_square_uses_containing_triangle() {
        let nodes = vec![v(&[0.0, 0.0]), v(&[1.0, 0.0]), v(&[1.0, 1.0]), v(&[0.0, 1.0])];
        let f = |x: f64, y: f64| DMatrix::from_column_slice(2, 1, &[x + 2.0 * y, 1.0 - y]);
        let samples: Vec<_> = nodes.iter().map(|n| f(n[0], n[1])).collect();
        let linear = LinearInterpolation::new();

        let out = linear.interpolate(&nodes, &samples, &v(&[0.5, 0.5])).unwrap();
        assert_relative_eq!(out, f(0.5, 0.5), epsilon = 1e-12);

        let out = linear.interpolate(&nodes, &samples, &v(&[0.25, 0.75])).unwrap();
        assert_relative_eq!(out, f(0.25, 0.75), epsilon = 1e-12);

        assert!(matches!(
            linear.interpolate(&nodes, &samples, &v(&[1.5, 0.5])),
            Err(ManifoldError::OutsideElement { .. })
        ));
    }

    #[test]
    fn test_linear_picks_delaunay_triangle() {
        // A kite split along its short diagonal: triangles (0, 2, 3) and (1, 2, 3).
        let nodes = vec![v(&[0.0, 0.0]), v(&[4.0, 0.0]), v(&[2.0, 1.0]), v(&[2.0, -1.0])];
        let samples: Vec<_> = nodes.iter().map(|n| constant(n[0] * n[0])).collect();
        let out = LinearInterpolation::new()
            .interpolate(&nodes, &samples, &v(&[1.5, 0.0]))
            .unwrap();
        assert_relative_eq!(out, constant(3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_rejects_collinear_nodes() {
        let nodes = vec![v(&[0.0, 0.0]), v(&[1.0, 1.0]), v(&[2.0, 2.0])];
        let samples = vec![constant(0.0), constant(1.0), constant(2.0)];
        assert!(matches!(
            LinearInterpolation::new().interpolate(&nodes, &samples, &v(&[1.0, 1.0])),
            Err(ManifoldError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_next_combination_enumerates_in_order() {
        let mut subset = vec![0, 1, 2];
        let mut seen = vec![subset.clone()];
        while next_combination(&mut subset, 5) {
            seen.push(subset.clone());
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(seen[1], vec![0, 1, 3]);
        assert_eq!(seen[9], vec![2, 3, 4]);
    }

    #[test]
    fn test_input_validation() {
        let nodes = vec![v(&[0.0]), v(&[1.0]), v(&[2.0])];
        let two = vec![constant(0.0), constant(1.0)];
        assert!(validate_inputs(&nodes[..2], &two, &v(&[0.5])).is_err());

        let mixed = vec![constant(0.0), constant(1.0), DMatrix::zeros(3, 2)];
        assert!(matches!(
            validate_inputs(&nodes, &mixed, &v(&[0.5])),
            Err(ManifoldError::DimensionMismatch { .. })
        ));

        let samples = vec![constant(0.0), constant(1.0), constant(2.0)];
        assert!(validate_inputs(&nodes[..2], &samples, &v(&[0.5])).is_err());
        assert!(validate_inputs(&nodes, &samples, &v(&[0.5, 0.5])).is_err());
        assert!(validate_inputs(&nodes, &samples, &v(&[0.5])).is_ok());
    }

    /// Predicts the mean of the training values and counts fits.
    #[derive(Debug, Default)]
    struct MeanFactory {
        fits: AtomicUsize,
    }

    struct MeanSurrogate(f64);

    impl Surrogate<f64> for MeanSurrogate {
        fn predict(&self, _query: &DVector<f64>, want_error: bool) -> Result<Prediction<f64>> {
            assert!(!want_error);
            Ok(Prediction::value(self.0))
        }
    }

    impl SurrogateFactory<f64> for MeanFactory {
        fn fit(
            &self,
            samples: &[DVector<f64>],
            values: &[f64],
            _config: &KrigingConfig,
        ) -> Result<Box<dyn Surrogate<f64>>> {
            assert_eq!(samples.len(), values.len());
            self.fits.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MeanSurrogate(
                values.iter().sum::<f64>() / values.len() as f64,
            )))
        }
    }

    #[test]
    fn test_kriging_skips_constant_entries() {
        let factory = Arc::new(MeanFactory::default());
        let kriging = KrigingInterpolation::new(factory.clone(), KrigingConfig::default()).unwrap();

        let nodes = vec![v(&[0.0]), v(&[1.0]), v(&[2.0])];
        // Entry (0, 0) varies, the others are constant.
        let samples: Vec<_> = [1.0, 2.0, 6.0]
            .iter()
            .map(|&x| DMatrix::from_row_slice(2, 2, &[x, 0.0, 7.0, 0.0]))
            .collect();
        let out = kriging.interpolate(&nodes, &samples, &v(&[0.5])).unwrap();

        assert_eq!(factory.fits.load(Ordering::SeqCst), 1);
        assert_relative_eq!(out[(0, 0)], 3.0);
        assert_eq!(out[(0, 1)], 0.0);
        assert_eq!(out[(1, 0)], 7.0);
        assert_eq!(out[(1, 1)], 0.0);
    }

    #[test]
    fn test_kriging_rejects_invalid_config() {
        let factory: Arc<dyn SurrogateFactory<f64>> = Arc::new(MeanFactory::default());
        assert!(KrigingInterpolation::new(factory, KrigingConfig::new().with_restarts(0)).is_err());
    }
}
