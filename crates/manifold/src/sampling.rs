use std::f64::consts::{PI, TAU};

use nalgebra::Point3;
use rand::Rng;
use rand_chacha::ChaChaRng;

use crate::surface::ParametricSurface;
use crate::torus::Torus;

/// Sample from a Gaussian (normal) distribution using Box-Muller transform
///
/// # Arguments
/// * `rng` - Random number generator
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation
///
/// # Returns
/// A sample from the normal distribution N(mean, std_dev²)
pub fn sample_gaussian(rng: &mut ChaChaRng, mean: f64, std_dev: f64) -> f64 {
    // 1 - U keeps u1 in (0, 1] so the logarithm stays finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Sample a point uniformly (by area) on a torus
///
/// Both angles are drawn uniformly and the candidate is accepted with
/// probability proportional to the local area element `R + r·cos v`.
/// Accepted points are embedded directly, so they satisfy the torus
/// equation to floating-point precision.
///
/// # Examples
///
/// ```
/// use manifold::sampling::sample_on_torus;
/// use manifold::{ImplicitSurface, Torus};
/// use rand::SeedableRng;
/// use rand_chacha::ChaChaRng;
///
/// let torus = Torus::new(1.0, 3.0).unwrap();
/// let mut rng = ChaChaRng::seed_from_u64(7);
/// let p = sample_on_torus(&torus, &mut rng);
/// assert!(torus.value(&p).abs() < 1e-9);
/// ```
pub fn sample_on_torus(torus: &Torus, rng: &mut ChaChaRng) -> Point3<f64> {
    loop {
        let u = rng.random::<f64>() * TAU;
        let v = rng.random::<f64>() * TAU;
        if rng.random::<f64>() < torus.area_weight(v) {
            return torus.embed(u, v);
        }
    }
}

/// Sample `count` independent points on a torus
pub fn sample_points_on_torus(torus: &Torus, count: usize, rng: &mut ChaChaRng) -> Vec<Point3<f64>> {
    (0..count).map(|_| sample_on_torus(torus, rng)).collect()
}
