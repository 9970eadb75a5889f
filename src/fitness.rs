//! Fitness vectors aligned to state indices.
//!
//! Larger is better throughout the crate. Noise helpers keep the length and the index
//! alignment; they only change which value sits at which index (or perturb values in place).

use crate::ga::ga_state_count;
use crate::{Error, Result};
use rand_distr::{Distribution, Normal};

/// OneMax over all `2^length` bitstrings: fitness of state `i` is the number of set bits.
pub fn onemax(length: usize) -> Result<Vec<f64>> {
    let n = ga_state_count(length)?;
    Ok((0..n).map(|i| i.count_ones() as f64).collect())
}

/// Index-shuffling noise: apply `swaps` random transpositions to the fitness values.
///
/// `swaps = 0` returns an unchanged copy. Large `swaps` approaches a uniformly random
/// relabelling, which destroys the landscape's correlation with the operator.
pub fn permute_noise(fitness: &[f64], swaps: usize, rng: &mut impl rand::Rng) -> Vec<f64> {
    let mut out = fitness.to_vec();
    let n = out.len();
    if n < 2 {
        return out;
    }
    for _ in 0..swaps {
        let a = rng.random_range(0..n);
        let b = rng.random_range(0..n);
        out.swap(a, b);
    }
    out
}

/// Additive Gaussian noise with standard deviation `sigma`.
pub fn additive_noise(fitness: &[f64], sigma: f64, rng: &mut impl rand::Rng) -> Result<Vec<f64>> {
    if !(sigma >= 0.0) || !sigma.is_finite() {
        return Err(Error::InvalidParameter("sigma must be finite and >= 0"));
    }
    let normal =
        Normal::new(0.0, sigma).map_err(|_| Error::InvalidParameter("invalid Normal params"))?;
    Ok(fitness.iter().map(|&f| f + normal.sample(rng)).collect())
}
