//! Property tests for the shared linear-algebra and layout primitives.

use manifoldkit_core::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn dense_matrix(max_dim: usize) -> impl Strategy<Value = DMatrix<f64>> {
    (1..=max_dim, 1..=max_dim).prop_flat_map(|(m, n)| {
        prop::collection::vec(-10.0f64..10.0, m * n)
            .prop_map(move |values| DMatrix::from_column_slice(m, n, &values))
    })
}

#[test]
fn test_squareform_follows_pair_order() {
    let n = 5;
    let condensed: Vec<f64> = (0..pair_count(n)).map(|k| k as f64 + 0.5).collect();
    let square = squareform(&condensed, &vec![1.0; n]).unwrap();
    for (k, (i, j)) in pair_indices(n).into_iter().enumerate() {
        assert_eq!(square[(i, j)], condensed[k]);
        assert_eq!(square[(j, i)], condensed[k]);
    }
    for i in 0..n {
        assert_eq!(square[(i, i)], 1.0);
    }
}

#[test]
fn test_sparse_pipeline_on_knn_pattern() {
    let mut coo = CooMatrix::new(4, 4);
    for i in 0..4 {
        coo.push(i, i, 1.0).unwrap();
    }
    coo.push(0, 1, 0.7).unwrap();
    coo.push(2, 1, 0.4).unwrap();
    coo.push(3, 0, 0.2).unwrap();
    let knn = coo.to_csr();
    let symmetric = knn.symmetrize_max().unwrap();

    let dense = symmetric.to_dense();
    assert_eq!(dense, dense.transpose());
    assert_eq!(symmetric.nnz(), 10);

    let block = DMatrix::from_fn(4, 2, |i, j| (i + j) as f64);
    let product = symmetric.mul_dense(&block).unwrap();
    assert!((product - &dense * &block).norm() < 1e-12);
}

#[test]
fn test_random_orthonormal_is_orthonormal() {
    let mut rng = StdRng::seed_from_u64(8);
    for &(n, p) in &[(3, 1), (7, 3), (20, 20)] {
        let x: DMatrix<f64> = random_orthonormal(n, p, &mut rng);
        assert_eq!(x.shape(), (n, p));
        assert!(is_orthonormal(&x));
    }
}

proptest! {
    #[test]
    fn prop_truncated_svd_reconstructs(a in dense_matrix(6)) {
        let svd = thin_svd(&a).unwrap();
        let rebuilt = &svd.u * svd.sigma() * &svd.v_t;
        prop_assert!((&rebuilt - &a).norm() <= 1e-9 * (1.0 + a.norm()));
        for k in 1..svd.rank() {
            prop_assert!(svd.singular_values[k - 1] >= svd.singular_values[k]);
        }
    }

    #[test]
    fn prop_numerical_rank_bounded(a in dense_matrix(6)) {
        let rank = numerical_rank(&a);
        prop_assert!(rank <= a.nrows().min(a.ncols()));
    }

    #[test]
    fn prop_orthonormalize_spans_input(a in dense_matrix(6)) {
        prop_assume!(a.ncols() <= a.nrows());
        prop_assume!(numerical_rank(&a) == a.ncols());
        let q = orthonormalize(&a);
        prop_assert!(is_orthonormal(&q));
        // Columns of `a` lie in the span of `q`.
        let residual = &a - &q * (q.transpose() * &a);
        prop_assert!(residual.norm() <= 1e-8 * (1.0 + a.norm()));
    }
}
