//! Comparison and summary scalars (small + explicit).
//!
//! These helpers surface the exact scalar computed and nothing else: no hidden normalization,
//! no weighting by stationary mass.

use crate::{Error, Result};
use ndarray::ArrayView2;

/// Root-mean-square elementwise difference between two TP matrices over the same state space.
///
/// \[
/// d(A, B) = \sqrt{\frac{1}{N^2} \sum_{i,j} (A_{ij} - B_{ij})^2}
/// \]
///
/// Symmetric by construction, and `0` iff the matrices are equal.
pub fn rmse_distance(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(Error::DimensionMismatch("matrices must have the same shape"));
    }
    if a.is_empty() {
        return Err(Error::InvalidParameter("matrices must be non-empty"));
    }
    let mut s = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        s += d * d;
    }
    Ok((s / a.len() as f64).sqrt())
}

/// Mean and population standard deviation. `None` for an empty slice.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mu = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / n;
    Some((mu, var.sqrt()))
}
