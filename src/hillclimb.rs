//! Hill-climbing driven by an operator's TP matrix.
//!
//! The operator defines *which* states are neighbours (nonzero entries of the current row) and,
//! when the search is stuck, *how* it moves randomly (a draw from that row).

use crate::transition::validate_tp;
use crate::walk::{resolve_start, sample_categorical};
use crate::{Error, Result, ROW_SUM_TOL};
use ndarray::ArrayView2;

/// Move policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HillClimbStrategy {
    /// Move to the fittest neighbour if it strictly improves on the current state; otherwise
    /// make one random move sampled from the TP row (escape from local optima).
    #[default]
    Greedy,
    /// Ignore fitness when moving: every move is sampled from the TP row. Fitness is only
    /// observed, so `best` reports the best state the walk happened to visit.
    RandomWalk,
}

/// Output of one hill-climb run.
#[derive(Debug, Clone, PartialEq)]
pub struct HillClimbResult {
    /// Visited states, `steps + 1` entries (start first).
    pub states: Vec<usize>,
    /// Fitness of each visited state.
    pub fitness: Vec<f64>,
    /// Best fitness over the whole trajectory.
    pub best: f64,
}

/// Run exactly `steps` iterations from `start` (state 0 if `None`). Fitness is maximized.
///
/// Under [`HillClimbStrategy::Greedy`], ties between equally fit neighbours go to the lowest
/// state index. There is no early stopping: a run that has converged keeps making random
/// escape moves until `steps` is exhausted.
pub fn hillclimb(
    tp: &ArrayView2<f64>,
    fitness: &[f64],
    steps: usize,
    start: Option<usize>,
    strategy: HillClimbStrategy,
    rng: &mut impl rand::Rng,
) -> Result<HillClimbResult> {
    validate_tp(tp, ROW_SUM_TOL)?;
    let n = tp.nrows();
    if fitness.len() != n {
        return Err(Error::DimensionMismatch(
            "fitness length must match the number of states",
        ));
    }
    if fitness.iter().any(|f| !f.is_finite()) {
        return Err(Error::InvalidParameter("fitness values must be finite"));
    }
    if steps == 0 {
        return Err(Error::InvalidParameter("steps must be >= 1"));
    }
    let mut current = resolve_start(n, start)?;

    let mut states = Vec::with_capacity(steps + 1);
    let mut fits = Vec::with_capacity(steps + 1);
    states.push(current);
    fits.push(fitness[current]);
    let mut best = fitness[current];

    for _ in 0..steps {
        let row = tp.row(current);
        current = match strategy {
            HillClimbStrategy::Greedy => {
                let mut arg: Option<usize> = None;
                for (j, &p) in row.iter().enumerate() {
                    if p <= 0.0 {
                        continue;
                    }
                    match arg {
                        Some(a) if fitness[j] <= fitness[a] => {}
                        _ => arg = Some(j),
                    }
                }
                match arg {
                    Some(j) if fitness[j] > fitness[current] => j,
                    _ => sample_categorical(&row, rng),
                }
            }
            HillClimbStrategy::RandomWalk => sample_categorical(&row, rng),
        };
        states.push(current);
        fits.push(fitness[current]);
        best = best.max(fitness[current]);
    }

    Ok(HillClimbResult {
        states,
        fitness: fits,
        best,
    })
}
