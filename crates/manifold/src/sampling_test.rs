use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::sampling::{sample_gaussian, sample_on_torus, sample_points_on_torus};
use crate::surface::ImplicitSurface;
use crate::torus::Torus;

#[test]
fn sample_gaussian_produces_reasonable_values() {
    let mut rng = ChaChaRng::seed_from_u64(42);

    let samples: Vec<f64> = (0..2000)
        .map(|_| sample_gaussian(&mut rng, 5.0, 1.0))
        .collect();
    let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance: f64 =
        samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;

    assert!((mean - 5.0).abs() < 0.1, "Mean {} should be close to 5.0", mean);
    assert!(
        (variance.sqrt() - 1.0).abs() < 0.1,
        "Std dev {} should be close to 1.0",
        variance.sqrt()
    );
}

#[test]
fn sampled_points_satisfy_torus_equation() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mut rng = ChaChaRng::seed_from_u64(3);

    for p in sample_points_on_torus(&torus, 500, &mut rng) {
        assert_abs_diff_eq!(torus.value(&p), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn sampling_is_reproducible_for_a_seed() {
    let torus = Torus::new(0.5, 2.0).unwrap();
    let a = sample_points_on_torus(&torus, 20, &mut ChaChaRng::seed_from_u64(11));
    let b = sample_points_on_torus(&torus, 20, &mut ChaChaRng::seed_from_u64(11));
    assert_eq!(a, b);
}

#[test]
fn outer_half_is_sampled_more_often() {
    // Area density favors the outer side of the tube (cos v > 0)
    let torus = Torus::new(1.0, 2.0).unwrap();
    let mut rng = ChaChaRng::seed_from_u64(99);
    let outer = (0..4000)
        .map(|_| sample_on_torus(&torus, &mut rng))
        .filter(|p| (p.x * p.x + p.y * p.y).sqrt() > torus.major_radius())
        .count();
    assert!(outer > 2000, "outer count {}", outer);
}
