//! Bitstring (GA) mutation operators as Markov chains.
//!
//! State `i` of a length-`L` space is the bitstring whose bit `k` is `(i >> k) & 1`, so the
//! Hamming distance between states `i` and `j` is `(i ^ j).count_ones()`.

use crate::{Error, Result, MAX_STATES};
use ndarray::Array2;
use tracing::debug;

/// How bit-flip mutation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaMutation {
    /// Every bit flips independently with probability `pmut`.
    PerGene,
    /// Exactly one bit, chosen uniformly, flips per step.
    PerInd,
}

impl GaMutation {
    pub fn name(self) -> &'static str {
        match self {
            GaMutation::PerGene => "per_gene",
            GaMutation::PerInd => "per_ind",
        }
    }
}

/// Number of states in a length-`length` bitstring space, checked against [`MAX_STATES`].
pub fn ga_state_count(length: usize) -> Result<usize> {
    if length == 0 {
        return Err(Error::InvalidParameter("bitstring length must be >= 1"));
    }
    if length >= usize::BITS as usize || (1usize << length) > MAX_STATES {
        return Err(Error::StateSpaceTooLarge {
            states: 1usize.checked_shl(length as u32).unwrap_or(usize::MAX),
            max: MAX_STATES,
        });
    }
    Ok(1usize << length)
}

/// Build the TP matrix of bit-flip mutation over all `2^length` bitstrings.
///
/// - `PerGene`: `P(i -> j) = pmut^d (1 - pmut)^(length - d)` where `d` is the Hamming distance.
///   With `pmut = 1` every bit flips, so each state maps to its complement.
/// - `PerInd`: `P(i -> j) = 1 / length` if `d = 1`, else 0. No self-loops.
///
/// `pmut` must lie in `(0, 1]` for both modes (it is unused by `PerInd`).
pub fn build_ga_tp(length: usize, pmut: f64, mode: GaMutation) -> Result<Array2<f64>> {
    if !(pmut > 0.0 && pmut <= 1.0) || !pmut.is_finite() {
        return Err(Error::InvalidParameter("pmut must be in (0, 1]"));
    }
    let n = ga_state_count(length)?;
    debug!(length, pmut, mode = mode.name(), states = n, "building GA transition matrix");

    // Probability of a move at Hamming distance d, for d in 0..=length.
    let kernel: Vec<f64> = match mode {
        GaMutation::PerGene => (0..=length)
            .map(|d| pmut.powi(d as i32) * (1.0 - pmut).powi((length - d) as i32))
            .collect(),
        GaMutation::PerInd => (0..=length)
            .map(|d| if d == 1 { 1.0 / length as f64 } else { 0.0 })
            .collect(),
    };

    let mut tp = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let d = (i ^ j).count_ones() as usize;
            tp[[i, j]] = kernel[d];
        }
    }
    Ok(tp)
}
