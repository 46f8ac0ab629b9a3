//! End-to-end tests running the Grassmann toolkit into the diffusion embedding.

use manifoldkit::prelude::*;
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, SeedableRng};

fn random_points(count: usize, n: usize, p: usize, seed: u64) -> Vec<DMatrix<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_orthonormal(n, p, &mut rng)).collect()
}

#[test]
fn test_grassmann_kernel_feeds_diffusion_maps() {
    let points = random_points(8, 10, 3, 11);
    let grassmann = Grassmann::new();
    let kernel = grassmann.kernel(&points, &Ranks::Auto).unwrap();

    let maps = DiffusionMaps::new(DiffusionMapsConfig::new().with_n_evecs(3)).unwrap();
    let embedding = maps.fit_kernel(&kernel).unwrap();

    assert_eq!(embedding.coordinates.shape(), (8, 3));
    assert_eq!(embedding.epsilon, None);
    assert!(embedding.coordinates.iter().all(|v| v.is_finite()));
}

#[test]
fn test_subspace_samples_as_matrix_data() {
    let points = random_points(7, 6, 2, 5);
    let maps = DiffusionMaps::new(DiffusionMapsConfig::new()).unwrap();
    let embedding = maps
        .fit_data(&DiffusionData::Matrices(points))
        .unwrap();
    assert_eq!(embedding.len(), 7);
    assert!(embedding.epsilon.unwrap() > 0.0);
}

#[test]
fn test_mean_then_tangent_space() {
    let points = random_points(5, 9, 2, 23);
    let grassmann = Grassmann::new();
    let result = grassmann
        .karcher_mean(&points, &KarcherConfig::new().with_max_iterations(200))
        .unwrap();

    let tangents = log_map(&points, &result.mean).unwrap();
    let back = exp_map(&tangents, &result.mean).unwrap();
    for (x, y) in points.iter().zip(&back) {
        assert!(GrassmannDistance.compute(x, y).unwrap() < 1e-6);
    }
}
