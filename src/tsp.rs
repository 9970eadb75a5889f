//! Permutation (TSP) neighbourhood operators as Markov chains.
//!
//! State space: every permutation of `0..length`, indexed by lexicographic rank. No
//! canonicalization is applied (tours that differ by rotation or reflection are distinct
//! states), so a length-`L` space has `L!` states.
//!
//! Moves act on positions of the linear permutation. A row of the TP matrix is uniform over
//! the *distinct* permutations one move can reach, excluding the current one.

use crate::{Error, Result, MAX_STATES};
use ndarray::Array2;
use tracing::debug;

/// Longest permutation the builder will enumerate (`8! = 40320` states).
pub const MAX_TSP_LENGTH: usize = 8;

/// A single permutation move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TspMove {
    /// Exchange the elements at two positions.
    Swap,
    /// Reverse one contiguous segment.
    TwoOpt,
    /// Cut into `A|B|C|D` and reconnect as `A C B D` (segment exchange).
    ThreeOpt,
    /// Every non-identity reconnection of `A|B|C|D`: segment exchange and/or reversal of `B`, `C`.
    ThreeOptBroad,
}

impl TspMove {
    pub const ALL: [TspMove; 4] = [
        TspMove::TwoOpt,
        TspMove::ThreeOpt,
        TspMove::ThreeOptBroad,
        TspMove::Swap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TspMove::Swap => "swap",
            TspMove::TwoOpt => "2opt",
            TspMove::ThreeOpt => "3opt",
            TspMove::ThreeOptBroad => "3opt_broad",
        }
    }

    /// Smallest permutation length on which the move is defined.
    pub fn min_length(self) -> usize {
        match self {
            TspMove::Swap => 2,
            TspMove::TwoOpt | TspMove::ThreeOpt | TspMove::ThreeOptBroad => 3,
        }
    }
}

fn factorial(n: usize) -> usize {
    (1..=n).fold(1usize, |acc, k| acc.saturating_mul(k))
}

/// Number of states for `length`-permutations under `mv`, with parameter and ceiling checks.
pub fn tsp_state_count(length: usize, mv: TspMove) -> Result<usize> {
    if length < mv.min_length() {
        return Err(Error::InvalidParameter(match mv {
            TspMove::Swap => "swap needs permutations of length >= 2",
            _ => "2-opt/3-opt moves need permutations of length >= 3",
        }));
    }
    let n = factorial(length);
    if length > MAX_TSP_LENGTH || n > MAX_STATES {
        return Err(Error::StateSpaceTooLarge {
            states: n,
            max: MAX_STATES,
        });
    }
    Ok(n)
}

/// Lexicographic rank of a permutation of `0..perm.len()` (Lehmer code).
fn rank(perm: &[u8], fact: &[usize]) -> usize {
    let n = perm.len();
    let mut r = 0usize;
    for i in 0..n {
        let smaller_after = perm[i + 1..].iter().filter(|&&x| x < perm[i]).count();
        r += smaller_after * fact[n - 1 - i];
    }
    r
}

/// Advance to the next permutation in lexicographic order; false after the last one.
fn next_permutation(p: &mut [u8]) -> bool {
    let n = p.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && p[i - 1] >= p[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while p[j] <= p[i - 1] {
        j -= 1;
    }
    p.swap(i - 1, j);
    p[i..].reverse();
    true
}

/// Call `visit` on every permutation reachable from `perm` by one application of `mv`
/// (duplicates and `perm` itself may be visited).
fn for_each_neighbour(perm: &[u8], mv: TspMove, mut visit: impl FnMut(&[u8])) {
    let n = perm.len();
    let mut buf = perm.to_vec();
    match mv {
        TspMove::Swap => {
            for p in 0..n {
                for q in p + 1..n {
                    buf.copy_from_slice(perm);
                    buf.swap(p, q);
                    visit(&buf[..]);
                }
            }
        }
        TspMove::TwoOpt => {
            for p in 0..n {
                for q in p + 1..n {
                    buf.copy_from_slice(perm);
                    buf[p..=q].reverse();
                    visit(&buf[..]);
                }
            }
        }
        TspMove::ThreeOpt | TspMove::ThreeOptBroad => {
            // Cut points: A = [0, p), B = [p, q), C = [q, r), D = [r, n); B and C non-empty.
            for p in 0..n {
                for q in p + 1..n {
                    for r in q + 1..=n {
                        let (b, c) = (&perm[p..q], &perm[q..r]);
                        if mv == TspMove::ThreeOpt {
                            reconnect(&mut buf, perm, p, r, c, b, false, false);
                            visit(&buf[..]);
                            continue;
                        }
                        for swap_order in [false, true] {
                            for (rev_b, rev_c) in
                                [(false, false), (true, false), (false, true), (true, true)]
                            {
                                if !swap_order && !rev_b && !rev_c {
                                    continue;
                                }
                                if swap_order {
                                    reconnect(&mut buf, perm, p, r, c, b, rev_c, rev_b);
                                } else {
                                    reconnect(&mut buf, perm, p, r, b, c, rev_b, rev_c);
                                }
                                visit(&buf[..]);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Write `A first second D` into `buf`, optionally reversing either middle segment.
#[allow(clippy::too_many_arguments)]
fn reconnect(
    buf: &mut [u8],
    perm: &[u8],
    p: usize,
    r: usize,
    first: &[u8],
    second: &[u8],
    rev_first: bool,
    rev_second: bool,
) {
    buf.copy_from_slice(perm);
    let mid = p + first.len();
    buf[p..mid].copy_from_slice(first);
    buf[mid..r].copy_from_slice(second);
    if rev_first {
        buf[p..mid].reverse();
    }
    if rev_second {
        buf[mid..r].reverse();
    }
}

/// Build the TP matrix of `mv` over all permutations of `0..length`.
///
/// Row `i` puts mass `1/k` on each of the `k` distinct permutations one move reaches from
/// permutation `i` (self excluded). A state with no other neighbour keeps probability 1 on
/// itself.
pub fn build_tsp_tp(length: usize, mv: TspMove) -> Result<Array2<f64>> {
    let n = tsp_state_count(length, mv)?;
    debug!(length, mv = mv.name(), states = n, "building TSP transition matrix");

    let fact: Vec<usize> = (0..=length).map(factorial).collect();
    let mut tp = Array2::<f64>::zeros((n, n));
    let mut perm: Vec<u8> = (0..length as u8).collect();
    let mut targets: Vec<usize> = Vec::new();

    let mut i = 0usize;
    loop {
        debug_assert_eq!(rank(&perm, &fact), i);
        targets.clear();
        for_each_neighbour(&perm, mv, |q| targets.push(rank(q, &fact)));
        targets.sort_unstable();
        targets.dedup();
        targets.retain(|&j| j != i);

        if targets.is_empty() {
            tp[[i, i]] = 1.0;
        } else {
            let p = 1.0 / targets.len() as f64;
            for &j in &targets {
                tp[[i, j]] = p;
            }
        }

        i += 1;
        if !next_permutation(&mut perm) {
            break;
        }
    }
    debug_assert_eq!(i, n);
    Ok(tp)
}
