//! Integration tests for manifoldkit-grassmann
//!
//! These tests drive the toolkit through its public API only: projection,
//! pairwise evaluation, tangent maps, Karcher means and interpolation.

use manifoldkit_core::{linalg::random_orthonormal, ManifoldError, Result};
use manifoldkit_grassmann::{
    exp_map, log_map, project_points, ChordalDistance, Grassmann, GrassmannDistance,
    GrassmannMetric, KarcherConfig, KrigingConfig, Prediction, ProcrustesDistance,
    ProjectionDistance, Ranks, StrategyRegistry, Surrogate, SurrogateFactory, TerminationReason,
};
use nalgebra::{DMatrix, DVector};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    f64::consts::FRAC_PI_2,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

fn random_points(count: usize, n: usize, p: usize, seed: u64) -> Vec<DMatrix<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_orthonormal(n, p, &mut rng)).collect()
}

#[test]
fn test_three_random_points_scenario() {
    let points = random_points(3, 10, 3, 2024);
    let grassmann = Grassmann::new();
    let distances = grassmann.distance(&points, &Ranks::Auto).unwrap();

    assert_eq!(distances.len(), 3);
    let bound = 3.0_f64.sqrt() * FRAC_PI_2;
    for d in distances {
        assert!(d >= 0.0);
        assert!(d <= bound + 1e-12, "distance {} exceeds {}", d, bound);
    }
}

#[test]
fn test_identical_subspaces_have_zero_distance() {
    let x = random_points(1, 9, 4, 7).remove(0);
    assert!(GrassmannDistance.compute(&x, &x).unwrap() < 1e-6);
    assert!(ChordalDistance.compute(&x, &x).unwrap() < 1e-6);
}

#[test]
fn test_project_then_measure() {
    // Raw (non-orthonormal) rank-2 matrices.
    let raw: Vec<DMatrix<f64>> = (1..=3)
        .map(|k| {
            let a = DMatrix::from_fn(12, 2, |i, j| ((i + 1) as f64 * 0.3 * (j + k) as f64).sin());
            let b = DMatrix::from_fn(2, 5, |i, j| ((i + 2 * j + k) as f64).cos());
            a * b
        })
        .collect();

    let projected = project_points(&raw, &Ranks::Auto).unwrap();
    assert_eq!(projected.ranks, vec![2, 2, 2]);
    assert_eq!(projected.max_rank, 2);

    let distances = Grassmann::new()
        .distance(&projected.psi, &Ranks::Auto)
        .unwrap();
    assert_eq!(distances.len(), 3);
}

#[test]
fn test_rank_list_of_wrong_length() {
    let points = random_points(3, 6, 2, 1);
    assert!(matches!(
        Grassmann::new().distance(&points, &Ranks::Explicit(vec![2, 2])),
        Err(ManifoldError::InvalidRank { .. })
    ));
}

#[test]
fn test_kernel_matrix_properties() {
    let points = random_points(5, 8, 3, 99);
    let grassmann = Grassmann::new();
    let k = grassmann.kernel(&points, &Ranks::Auto).unwrap();

    for i in 0..5 {
        let self_kernel = grassmann.kernel_fn().compute(&points[i], &points[i]).unwrap();
        assert!((k[(i, i)] - self_kernel).abs() < 1e-12);
        for j in 0..5 {
            assert_eq!(k[(i, j)], k[(j, i)]);
            assert!(k[(i, j)] >= 0.0);
        }
    }
}

#[test]
fn test_log_exp_round_trip() {
    let mut rng = StdRng::seed_from_u64(31);
    let reference: DMatrix<f64> = random_orthonormal(10, 3, &mut rng);
    // Points within a small geodesic ball around the reference.
    let points: Vec<DMatrix<f64>> = (0..5)
        .map(|_| {
            let z: DMatrix<f64> = random_orthonormal(10, 3, &mut rng);
            let h = &z - &reference * (reference.transpose() * &z);
            let h = h.clone() * (0.3 / h.norm());
            exp_map(&[h], &reference).unwrap().remove(0)
        })
        .collect();

    let tangents = log_map(&points, &reference).unwrap();
    let back = exp_map(&tangents, &reference).unwrap();
    for (x, y) in points.iter().zip(&back) {
        assert!(GrassmannDistance.compute(x, y).unwrap() < 1e-6);
    }
}

#[test]
fn test_karcher_on_identical_inputs() {
    let x = random_points(1, 7, 2, 5).remove(0);
    let points = vec![x.clone(); 4];
    let result = Grassmann::new()
        .karcher_mean(&points, &KarcherConfig::new())
        .unwrap();
    assert_eq!(result.iterations, 1);
    assert_eq!(result.termination_reason, TerminationReason::Stationary);
    assert!((&result.mean - &x).norm() < 1e-10);
}

#[test]
fn test_registry_driven_toolkit() {
    let registry = StrategyRegistry::<f64>::with_builtins();
    let points = random_points(4, 6, 2, 12);
    for name in registry.metric_names() {
        let grassmann =
            Grassmann::from_registry(&registry, name, "projection_kernel", "linear_interp").unwrap();
        let d = grassmann.distance(&points, &Ranks::Auto).unwrap();
        assert_eq!(d.len(), 6, "{}", name);
    }
}

/// Fits a surrogate that predicts the average value and counts its fits.
#[derive(Debug, Default)]
struct CountingFactory {
    fits: AtomicUsize,
}

struct AverageSurrogate(f64);

impl Surrogate<f64> for AverageSurrogate {
    fn predict(&self, _query: &DVector<f64>, _want_error: bool) -> Result<Prediction<f64>> {
        Ok(Prediction::value(self.0))
    }
}

impl SurrogateFactory<f64> for CountingFactory {
    fn fit(
        &self,
        _samples: &[DVector<f64>],
        values: &[f64],
        _config: &KrigingConfig,
    ) -> Result<Box<dyn Surrogate<f64>>> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(Box::new(AverageSurrogate(mean)))
    }
}

#[test]
fn test_kriging_constant_entry_skips_surrogate() {
    let factory = Arc::new(CountingFactory::default());
    let mut registry = StrategyRegistry::<f64>::with_builtins();
    registry
        .register_kriging(factory.clone(), KrigingConfig::default())
        .unwrap();
    let grassmann = Grassmann::from_registry(
        &registry,
        "grassmann_distance",
        "projection_kernel",
        "kriging_interp",
    )
    .unwrap();

    let nodes: Vec<DVector<f64>> = (0..3).map(|i| DVector::from_element(1, i as f64)).collect();
    // Entry (0, 0) is zero everywhere, entry (1, 0) varies.
    let samples: Vec<DMatrix<f64>> = [1.0, 2.0, 3.0]
        .iter()
        .map(|&v| DMatrix::from_column_slice(2, 1, &[0.0, v]))
        .collect();

    let out = grassmann
        .interpolate_sample(&nodes, &samples, &DVector::from_element(1, 0.5))
        .unwrap();

    assert_eq!(out[(0, 0)], 0.0);
    assert_eq!(out[(1, 0)], 2.0);
    assert_eq!(factory.fits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_interpolation_requires_three_samples() {
    let nodes: Vec<DVector<f64>> = (0..2).map(|i| DVector::from_element(1, i as f64)).collect();
    let samples = vec![DMatrix::<f64>::zeros(2, 2); 2];
    assert!(Grassmann::new()
        .interpolate_sample(&nodes, &samples, &DVector::from_element(1, 0.5))
        .is_err());
}

fn orthonormal_pair() -> impl Strategy<Value = (DMatrix<f64>, DMatrix<f64>)> {
    (any::<u64>(), 3usize..9, 1usize..3).prop_map(|(seed, n, p)| {
        let mut rng = StdRng::seed_from_u64(seed);
        let x0 = random_orthonormal(n, p, &mut rng);
        let x1 = random_orthonormal(n, p, &mut rng);
        (x0, x1)
    })
}

proptest! {
    #[test]
    fn prop_metrics_are_symmetric_and_non_negative((x0, x1) in orthonormal_pair()) {
        let metrics: [&dyn GrassmannMetric<f64>; 4] = [
            &GrassmannDistance,
            &ChordalDistance,
            &ProcrustesDistance,
            &ProjectionDistance,
        ];
        for metric in metrics {
            let d01 = metric.compute(&x0, &x1).unwrap();
            let d10 = metric.compute(&x1, &x0).unwrap();
            prop_assert!(d01 >= 0.0);
            prop_assert!((d01 - d10).abs() < 1e-8, "{}: {} vs {}", metric.name(), d01, d10);
        }
    }
}
