//! Shared helpers for tests: seeded random data and a brute-force oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::squared_distance;


/// `num_items` points with `num_dims` coordinates uniformly drawn from `[0, 100)`.
pub(crate) fn random_points(num_items: usize, num_dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_items)
        .map(|_| (0..num_dims).map(|_| rng.gen_range(0.0..100.0)).collect())
        .collect()
}

/// Points on a coarse integer grid, so many share coordinates and distances.
pub(crate) fn clustered_points(num_items: usize, num_dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_items)
        .map(|_| (0..num_dims).map(|_| rng.gen_range(0..4) as f64).collect())
        .collect()
}

/// The `num` ids closest to `query`, ordered by `(squared distance, id)`.
pub(crate) fn brute_force_neighbors(points: &[Vec<f64>], query: &[f64], num: usize) -> Vec<u32> {
    let mut ranked: Vec<(f64, u32)> = points
        .iter()
        .enumerate()
        .map(|(id, point)| (squared_distance(point, query), id as u32))
        .collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));
    ranked.into_iter().take(num).map(|(_, id)| id).collect()
}
