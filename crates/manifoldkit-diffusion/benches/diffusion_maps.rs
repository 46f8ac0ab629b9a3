//! Benchmarks for the diffusion maps pipeline
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use manifoldkit_diffusion::{pairwise_distances, DiffusionData, DiffusionMaps, DiffusionMapsConfig};
use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn swiss_roll(n: usize) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut points = DMatrix::zeros(n, 3);
    for i in 0..n {
        let t = 1.5 * std::f64::consts::PI * (1.0 + 2.0 * rng.gen::<f64>());
        points[(i, 0)] = t * t.cos();
        points[(i, 1)] = 20.0 * rng.gen::<f64>();
        points[(i, 2)] = t * t.sin();
    }
    points
}

fn benchmark_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_distances");

    for &n in &[100, 500, 1000] {
        let data = DiffusionData::Points(swiss_roll(n));
        group.bench_with_input(BenchmarkId::new("euclidean", n), &n, |b, _| {
            b.iter(|| pairwise_distances(black_box(&data)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("diffusion_maps");
    group.sample_size(10);

    for &n in &[100, 300, 600] {
        let data = DiffusionData::Points(swiss_roll(n));

        let dense = DiffusionMaps::new(DiffusionMapsConfig::new().with_n_evecs(3)).unwrap();
        group.bench_with_input(BenchmarkId::new("dense", n), &n, |b, _| {
            b.iter(|| dense.fit_data(black_box(&data)).unwrap())
        });

        let sparse = DiffusionMaps::new(
            DiffusionMapsConfig::new()
                .with_n_evecs(3)
                .with_k_neighbors(10),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("sparse_knn10", n), &n, |b, _| {
            b.iter(|| sparse.fit_data(black_box(&data)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_distances, benchmark_mapping);
criterion_main!(benches);
