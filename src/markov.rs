//! Quantities derived from a TP matrix: communicating classes, stationary distribution,
//! mean first passage times (MFPT), minimum step counts and in-degrees.
//!
//! Structure (reachability) is read off the *support graph*: an edge `i -> j` exists iff
//! `P[i, j] > 0`. Structural functions only look at that support; numerical ones first
//! require a valid TP matrix and then use dense solves from `linalg`.

use crate::linalg::Lu;
use crate::transition::{check_square, validate_tp};
use crate::{Error, Result, ROW_SUM_TOL};
use ndarray::{Array1, Array2, ArrayView2};
use petgraph::algo::{condensation, dijkstra};
use petgraph::graph::DiGraph;
use petgraph::Direction;
use tracing::debug;

/// Strongly connected components of the support graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicatingClasses {
    /// `labels[i]` is the class of state `i`; classes are numbered `0..count`.
    pub labels: Vec<usize>,
    /// `closed[c]` is true iff no transition leaves class `c`.
    pub closed: Vec<bool>,
}

impl CommunicatingClasses {
    pub fn count(&self) -> usize {
        self.closed.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.iter().filter(|&&c| c).count()
    }
}

/// Support graph of `tp`. Node `i` carries state index `i`, and node indices follow state order.
pub fn support_graph(tp: &ArrayView2<f64>) -> Result<DiGraph<usize, ()>> {
    let n = check_square(tp)?;
    let mut g = DiGraph::<usize, ()>::with_capacity(n, n);
    let nodes: Vec<_> = (0..n).map(|i| g.add_node(i)).collect();
    for ((i, j), &p) in tp.indexed_iter() {
        if p > 0.0 {
            g.add_edge(nodes[i], nodes[j], ());
        }
    }
    Ok(g)
}

/// Communicating classes from the condensation of the support graph. A class is closed iff its
/// condensed node has no outgoing edge.
pub fn communicating_classes(tp: &ArrayView2<f64>) -> Result<CommunicatingClasses> {
    let g = support_graph(tp)?;
    let n = g.node_count();
    let condensed = condensation(g, true);

    let mut labels = vec![0usize; n];
    let mut closed = Vec::with_capacity(condensed.node_count());
    for c in condensed.node_indices() {
        for &state in &condensed[c] {
            labels[state] = c.index();
        }
        closed.push(
            condensed
                .neighbors_directed(c, Direction::Outgoing)
                .next()
                .is_none(),
        );
    }
    Ok(CommunicatingClasses { labels, closed })
}

/// True iff every state can reach every other state.
pub fn is_irreducible(tp: &ArrayView2<f64>) -> Result<bool> {
    Ok(communicating_classes(tp)?.count() == 1)
}

/// Stationary distribution `π` with `π P = π`, `Σ π = 1`.
///
/// Solves `(Pᵀ - I) π = 0` with the last balance equation replaced by the normalization
/// constraint. The solution is unique iff the chain has exactly one closed communicating class;
/// otherwise this fails with [`Error::ReducibleChain`]. Transient states get mass 0.
pub fn stationary(tp: &ArrayView2<f64>) -> Result<Array1<f64>> {
    validate_tp(tp, ROW_SUM_TOL)?;
    let classes = communicating_classes(tp)?;
    if classes.closed_count() != 1 {
        return Err(Error::ReducibleChain(
            "stationary distribution is not unique: more than one closed class",
        ));
    }
    solve_stationary(tp)
}

fn solve_stationary(tp: &ArrayView2<f64>) -> Result<Array1<f64>> {
    let n = tp.nrows();
    let mut a = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            a[[i, j]] = tp[[j, i]];
        }
        a[[i, i]] -= 1.0;
    }
    a.row_mut(n - 1).fill(1.0);
    let mut b = Array1::<f64>::zeros(n);
    b[n - 1] = 1.0;

    let mut pi = Lu::factor(&a.view())?.solve(&b.view());

    // Clamp round-off below zero, then renormalize what is left.
    pi.mapv_inplace(|x| x.max(0.0));
    let total = pi.sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(Error::ReducibleChain("stationary solve produced no mass"));
    }
    pi /= total;
    Ok(pi)
}

/// Mean first passage time matrix: `M[i, j]` is the expected number of steps to first reach
/// `j` from `i`. The diagonal is 0 by convention.
///
/// Uses the fundamental matrix `Z = (I - P + 1 πᵀ)⁻¹` and `M[i, j] = (Z[j, j] - Z[i, j]) / π[j]`.
/// Requires an irreducible chain; otherwise some passage times are infinite and this fails
/// with [`Error::ReducibleChain`].
pub fn mfpt(tp: &ArrayView2<f64>) -> Result<Array2<f64>> {
    validate_tp(tp, ROW_SUM_TOL)?;
    let n = tp.nrows();
    if !is_irreducible(tp)? {
        return Err(Error::ReducibleChain(
            "mean first passage times need an irreducible chain",
        ));
    }
    let pi = solve_stationary(tp)?;
    debug!(states = n, "computing MFPT via fundamental matrix");

    let mut a = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let id = if i == j { 1.0 } else { 0.0 };
            a[[i, j]] = id - tp[[i, j]] + pi[j];
        }
    }
    let z = Lu::factor(&a.view())?.inverse();

    let mut m = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                m[[i, j]] = (z[[j, j]] - z[[i, j]]) / pi[j];
            }
        }
    }
    Ok(m)
}

/// Minimum number of moves from `i` to `j` over the support graph (unit-weight Dijkstra).
///
/// Unreachable pairs are `f64::INFINITY`; the diagonal is 0.
pub fn min_steps(tp: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let g = support_graph(tp)?;
    let n = g.node_count();
    let mut out = Array2::<f64>::from_elem((n, n), f64::INFINITY);
    for s in g.node_indices() {
        for (t, d) in dijkstra(&g, s, None, |_| 1usize) {
            out[[s.index(), t.index()]] = d as f64;
        }
    }
    Ok(out)
}

/// Support in-degree of each state: how many states reach it in one move (self-loops count).
pub fn in_degree(tp: &ArrayView2<f64>) -> Result<Vec<usize>> {
    let g = support_graph(tp)?;
    Ok(g.node_indices()
        .map(|v| g.neighbors_directed(v, Direction::Incoming).count())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::validate_tp;
    use ndarray::array;
    use proptest::prelude::*;

    fn two_blocks() -> Array2<f64> {
        array![
            [0.5, 0.5, 0.0, 0.0],
            [0.5, 0.5, 0.0, 0.0],
            [0.0, 0.0, 0.3, 0.7],
            [0.0, 0.0, 0.6, 0.4],
        ]
    }

    #[test]
    fn two_state_chain_closed_form() -> Result<()> {
        let (a, b) = (0.2f64, 0.5f64);
        let tp = array![[1.0 - a, a], [b, 1.0 - b]];
        let pi = stationary(&tp.view())?;
        assert!((pi[0] - b / (a + b)).abs() < 1e-12);
        assert!((pi[1] - a / (a + b)).abs() < 1e-12);

        let m = mfpt(&tp.view())?;
        assert_eq!(m[[0, 0]], 0.0);
        assert_eq!(m[[1, 1]], 0.0);
        assert!((m[[0, 1]] - 1.0 / a).abs() < 1e-9);
        assert!((m[[1, 0]] - 1.0 / b).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn periodic_cycle_is_still_solvable() -> Result<()> {
        // Deterministic 3-cycle: period 3, irreducible, uniform stationary distribution.
        let tp = array![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let pi = stationary(&tp.view())?;
        assert!(pi.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-12));
        let m = mfpt(&tp.view())?;
        assert!((m[[0, 1]] - 1.0).abs() < 1e-9);
        assert!((m[[0, 2]] - 2.0).abs() < 1e-9);
        assert!((m[[2, 1]] - 2.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn disconnected_blocks_are_reducible() -> Result<()> {
        let tp = two_blocks();
        let classes = communicating_classes(&tp.view())?;
        assert_eq!(classes.count(), 2);
        assert_eq!(classes.closed_count(), 2);
        assert_eq!(classes.labels[0], classes.labels[1]);
        assert_ne!(classes.labels[1], classes.labels[2]);
        assert!(matches!(stationary(&tp.view()), Err(Error::ReducibleChain(_))));
        assert!(matches!(mfpt(&tp.view()), Err(Error::ReducibleChain(_))));
        Ok(())
    }

    #[test]
    fn transient_state_gets_zero_stationary_mass_but_no_mfpt() -> Result<()> {
        let tp = array![[0.5, 0.5], [0.0, 1.0]];
        let pi = stationary(&tp.view())?;
        assert!(pi[0].abs() < 1e-12);
        assert!((pi[1] - 1.0).abs() < 1e-12);
        assert!(!is_irreducible(&tp.view())?);
        assert!(matches!(mfpt(&tp.view()), Err(Error::ReducibleChain(_))));
        Ok(())
    }

    #[test]
    fn min_steps_on_a_path() -> Result<()> {
        // 0 -> 1 -> 2, 2 absorbing.
        let tp = array![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        let d = min_steps(&tp.view())?;
        assert_eq!(d[[0, 2]], 2.0);
        assert_eq!(d[[1, 1]], 0.0);
        assert!(d[[2, 0]].is_infinite());
        Ok(())
    }

    #[test]
    fn non_stochastic_input_is_rejected_not_solved() {
        // Row 0 only carries mass 0.4.
        let sub = array![[0.2, 0.2], [0.5, 0.5]];
        assert!(matches!(
            stationary(&sub.view()),
            Err(Error::InvalidTransitionMatrix { row: 0, .. })
        ));
        assert!(matches!(
            mfpt(&sub.view()),
            Err(Error::InvalidTransitionMatrix { row: 0, .. })
        ));

        let zero_row = array![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            stationary(&zero_row.view()),
            Err(Error::InvalidTransitionMatrix { row: 0, .. })
        ));
    }

    #[test]
    fn closed_class_comes_from_the_condensation() -> Result<()> {
        // 0 and 1 communicate and leak into the absorbing pair {2, 3}.
        let tp = array![
            [0.5, 0.4, 0.1, 0.0],
            [0.6, 0.4, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
        ];
        let classes = communicating_classes(&tp.view())?;
        assert_eq!(classes.count(), 2);
        assert_eq!(classes.closed_count(), 1);
        assert_eq!(classes.labels[0], classes.labels[1]);
        assert_eq!(classes.labels[2], classes.labels[3]);
        assert!(classes.closed[classes.labels[2]]);
        assert!(!classes.closed[classes.labels[0]]);

        let pi = stationary(&tp.view())?;
        assert!(pi[0].abs() < 1e-12 && pi[1].abs() < 1e-12);
        assert!((pi[2] - 0.5).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn in_degree_counts_support_predecessors() -> Result<()> {
        let tp = array![[0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        assert_eq!(in_degree(&tp.view())?, vec![2, 1, 1]);
        let g = support_graph(&tp.view())?;
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 4);
        Ok(())
    }

    fn random_positive_tp(n: usize, seed: u64) -> Array2<f64> {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut tp = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                tp[[i, j]] = rng.random_range(0.05..1.0);
            }
            let s = tp.row(i).sum();
            tp.row_mut(i).mapv_inplace(|x| x / s);
        }
        tp
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            .. ProptestConfig::default()
        })]
        #[test]
        fn prop_mfpt_satisfies_first_step_equations(
            n in 2usize..10,
            seed in any::<u64>(),
        ) {
            let tp = random_positive_tp(n, seed);
            prop_assert!(validate_tp(&tp.view(), 1e-9).is_ok());

            let pi = stationary(&tp.view()).unwrap();
            let pi_next = pi.dot(&tp);
            for j in 0..n {
                prop_assert!((pi_next[j] - pi[j]).abs() < 1e-10);
            }

            let m = mfpt(&tp.view()).unwrap();
            // M[i, j] = 1 + Σ_{k != j} P[i, k] M[k, j] for i != j.
            for i in 0..n {
                prop_assert_eq!(m[[i, i]], 0.0);
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let mut rhs = 1.0;
                    for k in 0..n {
                        if k != j {
                            rhs += tp[[i, k]] * m[[k, j]];
                        }
                    }
                    prop_assert!((m[[i, j]] - rhs).abs() < 1e-8 * rhs.max(1.0));
                }
            }

            // Kemeny's constant: Σ_j π_j M[i, j] does not depend on i.
            let k0: f64 = (0..n).map(|j| pi[j] * m[[0, j]]).sum();
            for i in 1..n {
                let ki: f64 = (0..n).map(|j| pi[j] * m[[i, j]]).sum();
                prop_assert!((ki - k0).abs() < 1e-8 * k0.max(1.0));
            }
        }
    }
}
