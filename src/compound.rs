//! Compound operators: apply operator `k` with probability `w_k` at every step.
//!
//! The induced chain is the convex combination `Σ_k w_k P_k`. A convex combination of
//! row-stochastic matrices is row-stochastic, so nothing is renormalized; the result is still
//! validated before it is returned.

use crate::transition::validate_tp;
use crate::{Error, Result, ROW_SUM_TOL};
use ndarray::{Array2, ArrayView2};

/// Check that `weights` is a probability vector (within [`ROW_SUM_TOL`]).
fn validate_weights(weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(Error::InvalidWeights("need at least one weight"));
    }
    if weights.iter().any(|&w| !w.is_finite()) {
        return Err(Error::InvalidWeights("weights must be finite"));
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(Error::InvalidWeights("weights must be nonnegative"));
    }
    let s: f64 = weights.iter().sum();
    if (s - 1.0).abs() > ROW_SUM_TOL {
        return Err(Error::InvalidWeights("weights must sum to 1 (within 1e-6)"));
    }
    Ok(())
}

/// Weighted elementwise sum of TP matrices over the same state space.
///
/// - [`Error::DimensionMismatch`]: `weights.len() != matrices.len()`, or shapes differ.
/// - [`Error::InvalidWeights`]: negative weights, or weights not summing to 1.
///
/// `mix(&[1.0], &[p])` returns `p` exactly.
pub fn mix(weights: &[f64], matrices: &[ArrayView2<f64>]) -> Result<Array2<f64>> {
    if weights.len() != matrices.len() {
        return Err(Error::DimensionMismatch(
            "need exactly one weight per matrix",
        ));
    }
    validate_weights(weights)?;

    let dim = matrices[0].dim();
    if dim.0 != dim.1 {
        return Err(Error::DimensionMismatch("transition matrices must be square"));
    }
    if matrices.iter().any(|m| m.dim() != dim) {
        return Err(Error::DimensionMismatch(
            "all matrices must have the same shape",
        ));
    }

    let mut out = Array2::<f64>::zeros(dim);
    for (&w, m) in weights.iter().zip(matrices) {
        out.scaled_add(w, m);
    }
    validate_tp(&out.view(), ROW_SUM_TOL)?;
    Ok(out)
}

/// Uniform weights `1/k` for a `k`-operator compound.
pub fn uniform_weights(k: usize) -> Vec<f64> {
    vec![1.0 / k as f64; k]
}
