//! Gini coefficient of a discrete distribution.
//!
//! Applied to a TP row, the Gini coefficient is an exploration/exploitation proxy:
//! - `0` means the operator spreads its mass uniformly (maximally explorative),
//! - values near `1` mean almost all mass sits on one transition (exploitative).
//!
//! The input only needs positive total mass; the coefficient is scale-invariant, so
//! nothing is normalized first.

use crate::{Error, Result};
use ndarray::ArrayView2;

/// Gini coefficient: mean absolute difference over all ordered pairs, divided by twice the mean.
///
/// \[
/// G = \frac{\sum_i \sum_j |w_i - w_j|}{2 n^2 \mu}
/// \]
///
/// Computed from the sorted weights in `O(n log n)`:
/// `G = Σ_k (2k - n + 1) w_(k) / (n Σ w)`.
///
/// Errors with [`Error::InvalidDistribution`] on empty input, negative or non-finite weights,
/// or zero total mass.
pub fn gini(weights: &[f64]) -> Result<f64> {
    if weights.is_empty() {
        return Err(Error::InvalidDistribution("weights must be non-empty"));
    }
    if weights.iter().any(|&w| !w.is_finite()) {
        return Err(Error::InvalidDistribution("weights contain non-finite values"));
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(Error::InvalidDistribution("weights must be nonnegative"));
    }
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return Err(Error::InvalidDistribution("weights must have positive total mass"));
    }

    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mut acc = 0.0f64;
    for (k, &w) in sorted.iter().enumerate() {
        acc += (2.0 * k as f64 - n + 1.0) * w;
    }
    // Round-off can push a uniform vector a hair below zero.
    Ok((acc / (n * total)).max(0.0))
}

/// Row-wise Gini, aggregated to `(mean, population std)` across rows.
///
/// Works on any nonnegative matrix whose rows can be read as weight vectors. For a TP matrix
/// each row is a probability distribution and this is a proper Gini coefficient. For an MFPT
/// matrix the rows are expected hitting times, not probabilities: the result is then only an
/// informal concentration measure of those times (the zero diagonal stays in each row).
pub fn mu_sigma_gini(matrix: &ArrayView2<f64>) -> Result<(f64, f64)> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() == 0 {
        return Err(Error::InvalidDistribution("matrix must be non-empty"));
    }

    let mut values = Vec::with_capacity(n);
    for row in matrix.rows() {
        let g = match row.as_slice() {
            Some(s) => gini(s)?,
            None => gini(&row.to_vec())?,
        };
        values.push(g);
    }

    let mu = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|g| (g - mu) * (g - mu)).sum::<f64>() / n as f64;
    Ok((mu, var.sqrt()))
}
