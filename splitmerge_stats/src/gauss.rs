//! Standard-normal jitter used to place split clusters
use rand::Rng;

use crate::rv::dist::Gaussian;
use crate::rv::traits::Rv;

/// Draw a `dim`-dimensional vector of independent standard normals
pub fn draw_jitter<R: Rng>(dim: usize, rng: &mut R) -> Vec<f64> {
    let g = Gaussian::standard();
    (0..dim)
        .map(|_| {
            let z: f64 = g.draw(rng);
            z
        })
        .collect()
}

/// Log density of `zs` under the `zs.len()`-dimensional standard normal
pub fn ln_jitter_density(zs: &[f64]) -> f64 {
    let g = Gaussian::standard();
    zs.iter().map(|z| g.ln_f(z)).sum()
}

/// Log density of `xs` under independent N(0, sd²) in every dimension
pub fn ln_location_density(xs: &[f64], sd: f64) -> f64 {
    let g = Gaussian::new_unchecked(0.0, sd);
    xs.iter().map(|x| g.ln_f(x)).sum()
}
