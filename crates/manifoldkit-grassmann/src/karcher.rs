//! Karcher (Riemannian center of mass) estimation on the Grassmann manifold.
//!
//! Both estimators start from the input point with the smallest Fréchet
//! variance and then move the iterate along the averaged (batch) or
//! per-point (stochastic) tangent direction, mapping back to the manifold
//! after every step.
//!
//! Running out of iterations is not an error: the last iterate is returned
//! with [`TerminationReason::MaxIterations`].

use crate::{
    mapping::{exp_map_point, log_map, log_map_point},
    metric::GrassmannMetric,
};
use log::{debug, info, warn};
use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::{DMatrix, Scalar},
};
use num_traits::Float;
use rand::{rngs::StdRng, seq::SliceRandom, thread_rng, RngCore, SeedableRng};

/// Descent scheme used by [`karcher_mean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KarcherMethod {
    /// Full-batch gradient descent with step 0.5, or, with Nesterov
    /// acceleration, a full step along the blend of consecutive averaged
    /// tangents with weights `(ℓₖ − 1)/ℓₖ₊₁`, `ℓₖ₊₁ = (1 + √(1 + 4ℓₖ²))/2`,
    /// `ℓ₀ = 0`.
    GradientDescent {
        /// Blend consecutive averaged tangents with Nesterov weights.
        nesterov: bool,
    },
    /// Incremental updates over a shuffled pass of the inputs with a
    /// `1/k` step size.
    Stochastic,
}

impl Default for KarcherMethod {
    fn default() -> Self {
        KarcherMethod::GradientDescent { nesterov: false }
    }
}

/// Configuration for Karcher mean estimation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KarcherConfig<T: Scalar> {
    /// Descent scheme.
    pub method: KarcherMethod,
    /// Stopping threshold on the Frobenius displacement between iterates.
    pub tolerance: T,
    /// Iteration (epoch, for the stochastic scheme) budget.
    pub max_iterations: usize,
    /// Seed for the stochastic shuffle; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl<T: Scalar> Default for KarcherConfig<T> {
    fn default() -> Self {
        Self {
            method: KarcherMethod::default(),
            tolerance: T::DEFAULT_TOLERANCE,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl<T: Scalar> KarcherConfig<T> {
    /// Creates a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the descent scheme.
    pub fn with_method(mut self, method: KarcherMethod) -> Self {
        self.method = method;
        self
    }

    /// Batch gradient descent with Nesterov acceleration.
    pub fn with_nesterov(mut self) -> Self {
        self.method = KarcherMethod::GradientDescent { nesterov: true };
        self
    }

    /// Stochastic gradient descent.
    pub fn with_stochastic(mut self) -> Self {
        self.method = KarcherMethod::Stochastic;
        self
    }

    /// Sets the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Fixes the shuffle seed of the stochastic scheme.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the tolerance and iteration budget.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > T::zero()) {
            return Err(ManifoldError::invalid_parameter(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ManifoldError::invalid_parameter(
                "max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Why the Karcher iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The averaged tangent at the initial point was already below tolerance.
    Stationary,
    /// The displacement between consecutive iterates fell below tolerance.
    Converged,
    /// The iteration budget was exhausted.
    MaxIterations,
}

/// Outcome of [`karcher_mean`].
#[derive(Debug, Clone)]
pub struct KarcherResult<T: Scalar> {
    /// Estimated mean representative.
    pub mean: DMatrix<T>,
    /// Last tangent vectors computed: all inputs for the batch scheme, the
    /// final single update for the stochastic scheme.
    pub tangents: Vec<DMatrix<T>>,
    /// Iterations (epochs) performed.
    pub iterations: usize,
    /// Last displacement norm, or the initial averaged-tangent norm when the
    /// start point was already stationary.
    pub residual: T,
    /// Why the iteration stopped.
    pub termination_reason: TerminationReason,
    /// `false` only when the budget ran out.
    pub converged: bool,
}

impl<T: Scalar> KarcherResult<T> {
    fn new(
        mean: DMatrix<T>,
        tangents: Vec<DMatrix<T>>,
        iterations: usize,
        residual: T,
        termination_reason: TerminationReason,
    ) -> Self {
        match termination_reason {
            TerminationReason::MaxIterations => warn!(
                "Karcher mean did not converge in {} iterations (residual {:e})",
                iterations,
                <T as Scalar>::to_f64(residual)
            ),
            _ => info!(
                "Karcher mean converged after {} iterations (residual {:e})",
                iterations,
                <T as Scalar>::to_f64(residual)
            ),
        }
        Self {
            mean,
            tangents,
            iterations,
            residual,
            converged: termination_reason != TerminationReason::MaxIterations,
            termination_reason,
        }
    }
}

/// Mean squared distance from `candidate` to every point, under `metric`.
pub fn frechet_variance<T: Scalar>(
    candidate: &DMatrix<T>,
    points: &[DMatrix<T>],
    metric: &dyn GrassmannMetric<T>,
) -> Result<T> {
    if points.is_empty() {
        return Err(ManifoldError::invalid_parameter(
            "Fréchet variance needs at least one point",
        ));
    }
    let mut accum = T::zero();
    for p in points {
        let d = metric.compute(candidate, p)?;
        accum = accum + d * d;
    }
    Ok(accum / <T as Scalar>::from_usize(points.len()))
}

/// Index of the input with the smallest Fréchet variance (lowest on ties).
fn frechet_initializer<T: Scalar>(
    points: &[DMatrix<T>],
    metric: &dyn GrassmannMetric<T>,
) -> Result<usize> {
    let mut best = 0;
    let mut best_value = <T as Float>::infinity();
    for (i, p) in points.iter().enumerate() {
        let value = frechet_variance(p, points, metric)?;
        if value < best_value {
            best = i;
            best_value = value;
        }
    }
    debug!(
        "Karcher initializer: point {} (Fréchet variance {:e})",
        best,
        <T as Scalar>::to_f64(best_value)
    );
    Ok(best)
}

fn average<T: Scalar>(tangents: &[DMatrix<T>]) -> DMatrix<T> {
    let (nrows, ncols) = tangents[0].shape();
    let scale = T::one() / <T as Scalar>::from_usize(tangents.len());
    tangents
        .iter()
        .fold(DMatrix::zeros(nrows, ncols), |acc, t| acc + t * scale)
}

/// Estimates the Karcher mean of `points`.
///
/// `metric` is used only to pick the starting point.
///
/// # Errors
///
/// - `InvalidParameter` for fewer than two points or an invalid config.
/// - `DimensionMismatch` if the points differ in shape.
/// - `NumericalError` if an iterate and a point are too far apart for the
///   logarithmic map.
pub fn karcher_mean<T: Scalar>(
    points: &[DMatrix<T>],
    metric: &dyn GrassmannMetric<T>,
    config: &KarcherConfig<T>,
) -> Result<KarcherResult<T>> {
    config.validate()?;
    if points.len() < 2 {
        return Err(ManifoldError::invalid_parameter(format!(
            "Karcher mean needs at least 2 points, got {}",
            points.len()
        )));
    }
    let shape = points[0].shape();
    if let Some(bad) = points.iter().find(|p| p.shape() != shape) {
        return Err(ManifoldError::dimension_mismatch(
            format!("{}x{}", shape.0, shape.1),
            format!("{}x{}", bad.nrows(), bad.ncols()),
        ));
    }

    let start = points[frechet_initializer(points, metric)?].clone();
    match config.method {
        KarcherMethod::GradientDescent { nesterov } => {
            gradient_descent(points, start, nesterov, config)
        }
        KarcherMethod::Stochastic => {
            let mut rng: Box<dyn RngCore> = match config.seed {
                Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
                None => Box::new(thread_rng()),
            };
            stochastic_descent(points, start, config, &mut *rng)
        }
    }
}

fn gradient_descent<T: Scalar>(
    points: &[DMatrix<T>],
    mut mean: DMatrix<T>,
    nesterov: bool,
    config: &KarcherConfig<T>,
) -> Result<KarcherResult<T>> {
    let alpha = <T as Scalar>::from_f64(0.5);
    let half = <T as Scalar>::from_f64(0.5);
    let one = T::one();
    let four = <T as Scalar>::from_f64(4.0);

    // Nesterov state: momentum sequence ℓ and the previous averaged tangent.
    let mut ell = T::zero();
    let mut previous_avg: Option<DMatrix<T>> = None;

    let mut tangents = Vec::new();
    let mut residual = T::zero();

    for iteration in 1..=config.max_iterations {
        tangents = log_map(points, &mean)?;
        let avg = average(&tangents);
        let avg_norm = avg.norm();

        if iteration == 1 && avg_norm < config.tolerance {
            return Ok(KarcherResult::new(
                mean,
                tangents,
                iteration,
                avg_norm,
                TerminationReason::Stationary,
            ));
        }

        // The Nesterov blend is taken in full; only the plain average is damped.
        let step = if nesterov {
            let ell_next = half * (one + Float::sqrt(one + four * ell * ell));
            let mix = (ell - one) / ell_next;
            ell = ell_next;
            let prev = previous_avg.as_ref().unwrap_or(&avg);
            let blended = &avg * (one - mix) + prev * mix;
            previous_avg = Some(avg);
            blended
        } else {
            avg * alpha
        };

        let next = exp_map_point(&step, &mean)?;
        residual = (&next - &mean).norm();
        debug!(
            "Karcher iteration {}: |avg tangent| = {:e}, displacement = {:e}",
            iteration,
            <T as Scalar>::to_f64(avg_norm),
            <T as Scalar>::to_f64(residual)
        );
        if residual < config.tolerance {
            return Ok(KarcherResult::new(
                mean,
                tangents,
                iteration,
                residual,
                TerminationReason::Converged,
            ));
        }
        mean = next;
    }

    Ok(KarcherResult::new(
        mean,
        tangents,
        config.max_iterations,
        residual,
        TerminationReason::MaxIterations,
    ))
}

fn stochastic_descent<T: Scalar, R: RngCore + ?Sized>(
    points: &[DMatrix<T>],
    mut mean: DMatrix<T>,
    config: &KarcherConfig<T>,
    rng: &mut R,
) -> Result<KarcherResult<T>> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    let mut updates = 1usize;
    let mut last_tangent = DMatrix::zeros(mean.nrows(), mean.ncols());
    let mut residual = T::zero();

    for epoch in 1..=config.max_iterations {
        order.shuffle(rng);
        let epoch_start = mean.clone();

        for &idx in &order {
            // Step 2·(0.5/k) along the tangent towards point `idx`.
            let step_size = T::one() / <T as Scalar>::from_usize(updates);
            last_tangent = log_map_point(&points[idx], &mean)?;
            mean = exp_map_point(&(&last_tangent * step_size), &mean)?;
            updates += 1;
        }

        residual = (&mean - &epoch_start).norm();
        debug!(
            "stochastic Karcher epoch {}: displacement = {:e}",
            epoch,
            <T as Scalar>::to_f64(residual)
        );
        if residual < config.tolerance {
            return Ok(KarcherResult::new(
                mean,
                vec![last_tangent],
                epoch,
                residual,
                TerminationReason::Converged,
            ));
        }
    }

    Ok(KarcherResult::new(
        mean,
        vec![last_tangent],
        config.max_iterations,
        residual,
        TerminationReason::MaxIterations,
    ))
}
