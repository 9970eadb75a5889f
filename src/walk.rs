//! Random walks on a TP matrix.
//!
//! Convention shared with `hillclimb`: a trajectory of `steps` moves has `steps + 1` entries,
//! the start state first.

use crate::transition::validate_tp;
use crate::{Error, Result, ROW_SUM_TOL};
use ndarray::{ArrayView1, ArrayView2};
use std::collections::HashSet;

/// Inverse-CDF draw from one TP row.
pub(crate) fn sample_categorical(row: &ArrayView1<f64>, rng: &mut impl rand::Rng) -> usize {
    debug_assert!(!row.is_empty());
    debug_assert!(row.iter().all(|&p| p >= 0.0 && p.is_finite()));
    // Roundoff can leave the cumulative sum a hair below 1. Fall back to the last index that
    // carries mass, never to a zero-probability state.
    let u: f64 = rng.random();
    let mut acc = 0.0f64;
    let mut last_positive = 0usize;
    for (idx, &p) in row.iter().enumerate() {
        if p > 0.0 {
            acc += p;
            last_positive = idx;
            if u < acc {
                return idx;
            }
        }
    }
    last_positive
}

pub(crate) fn resolve_start(n: usize, start: Option<usize>) -> Result<usize> {
    let s = start.unwrap_or(0);
    if s >= n {
        return Err(Error::InvalidParameter("start state out of range"));
    }
    Ok(s)
}

/// Walk `steps` moves on `tp` from `start` (state 0 if `None`).
///
/// Each move samples the next state from the current state's row. Returns `steps + 1` states.
/// `tp` must be a valid TP matrix; a row without full mass is an
/// [`Error::InvalidTransitionMatrix`], never a silent self-move.
pub fn walk(
    tp: &ArrayView2<f64>,
    steps: usize,
    start: Option<usize>,
    rng: &mut impl rand::Rng,
) -> Result<Vec<usize>> {
    validate_tp(tp, ROW_SUM_TOL)?;
    let n = tp.nrows();
    if steps == 0 {
        return Err(Error::InvalidParameter("steps must be >= 1"));
    }
    let mut state = resolve_start(n, start)?;

    let mut trajectory = Vec::with_capacity(steps + 1);
    trajectory.push(state);
    for _ in 0..steps {
        state = sample_categorical(&tp.row(state), rng);
        trajectory.push(state);
    }
    Ok(trajectory)
}

/// Fraction of distinct states in a trajectory: `|distinct| / |trajectory|`.
pub fn unique_fraction(trajectory: &[usize]) -> Result<f64> {
    if trajectory.is_empty() {
        return Err(Error::InvalidParameter("trajectory must be non-empty"));
    }
    let distinct: HashSet<usize> = trajectory.iter().copied().collect();
    Ok(distinct.len() as f64 / trajectory.len() as f64)
}
