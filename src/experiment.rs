//! Experiment sweeps over declared (representation, operator) setups.
//!
//! Everything here is explicit: the list of setups is a value, configuration is a struct with
//! defaults, randomness is derived from `ExperimentConfig::seed`, and persistence goes through
//! an injected [`MatrixStore`]. Run `r` of any repeated batch uses
//! `ChaCha8Rng::seed_from_u64(seed + r)`.

use crate::compound::{mix, uniform_weights};
use crate::fitness::{onemax, permute_noise};
use crate::ga::GaMutation;
use crate::gini::mu_sigma_gini;
use crate::hillclimb::{hillclimb, HillClimbStrategy};
use crate::markov::{in_degree, mfpt, min_steps, stationary};
use crate::metrics::{mean_std, rmse_distance};
use crate::representation::{build_tp, RepresentationSpec};
use crate::store::MatrixStore;
use crate::transition::{from_external, uniformify};
use crate::tsp::{build_tsp_tp, TspMove};
use crate::walk::{unique_fraction, walk};
use crate::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// One (representation, operator) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setup {
    /// Bitstrings with `pmut = 1 / length`.
    Ga { length: usize, mutation: GaMutation },
    Tsp { length: usize, mv: TspMove },
    /// GP trees up to `depth` under subtree mutation. The TP matrix is produced outside this
    /// crate and must already be in the store.
    Tree { depth: usize },
}

impl Setup {
    /// Storage key prefix, e.g. `ga_length_8_per_gene`, `tsp_length_6_2opt`, `depth_2_subtree`.
    pub fn name(&self) -> String {
        match self {
            Setup::Ga { length, mutation } => format!("ga_length_{length}_{}", mutation.name()),
            Setup::Tsp { length, mv } => format!("tsp_length_{length}_{}", mv.name()),
            Setup::Tree { depth } => format!("depth_{depth}_subtree"),
        }
    }

    pub fn tp_key(&self) -> String {
        format!("{}/TP", self.name())
    }

    pub fn mfpt_key(&self) -> String {
        format!("{}/MFPT", self.name())
    }

    /// Minimum move counts (shortest paths over the support graph).
    pub fn sp_key(&self) -> String {
        format!("{}/SP", self.name())
    }

    /// Stationary distribution, stored as a single row.
    pub fn stationary_key(&self) -> String {
        format!("{}/STATIONARY", self.name())
    }

    /// Builder spec for setups this crate can build itself; `None` for trees.
    pub fn spec(&self) -> Option<RepresentationSpec> {
        match *self {
            Setup::Ga { length, mutation } => Some(RepresentationSpec::Ga {
                length,
                pmut: 1.0 / length as f64,
                mutation,
            }),
            Setup::Tsp { length, mv } => Some(RepresentationSpec::Tsp { length, mv }),
            Setup::Tree { .. } => None,
        }
    }
}

/// The setups of the reference study.
pub fn reference_setups() -> Vec<Setup> {
    let mut out = Vec::new();
    for mutation in [GaMutation::PerGene, GaMutation::PerInd] {
        for length in [8, 10, 12] {
            out.push(Setup::Ga { length, mutation });
        }
    }
    for depth in [1, 2] {
        out.push(Setup::Tree { depth });
    }
    for mv in [TspMove::TwoOpt, TspMove::ThreeOpt, TspMove::Swap] {
        for length in [6, 7, 8] {
            out.push(Setup::Tsp { length, mv });
        }
    }
    out
}

/// Knobs for the sweeps.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Random walks per setup (each of length `N`).
    pub walk_reps: usize,
    /// Hill-climb runs per (pmut, noise level).
    pub hc_reps: usize,
    /// Steps per hill-climb run.
    pub hc_steps: usize,
    /// Base RNG seed.
    pub seed: u64,
    /// Per-gene mutation rates for the GA hill-climb experiment.
    pub pmuts: Vec<f64>,
    /// Index-shuffling noise levels (number of random transpositions of fitness values).
    pub noise_levels: Vec<usize>,
    /// Blend factor towards the uniform chain applied before hill-climbing (0 = off).
    pub uniformify: f64,
    /// Bitstring length for the GA hill-climb experiment.
    pub ga_hc_length: usize,
    /// Largest state space for which MFPT, shortest paths and the stationary distribution are
    /// derived. These are dense `O(N^2)` matrices with `O(N^3)` solves; larger setups only get
    /// TP statistics and walks.
    pub dense_max_states: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            walk_reps: 30,
            hc_reps: 30,
            hc_steps: 50,
            seed: 0,
            pmuts: vec![
                0.0001,
                0.001 / 3.0,
                0.001,
                0.01 / 3.0,
                0.01,
                0.1 / 3.0,
                0.1,
                1.0 / 3.0,
            ],
            noise_levels: vec![0, 1, 10, 100, 1000],
            uniformify: 0.0,
            ga_hc_length: 10,
            dense_max_states: 5040,
        }
    }
}

/// Landscape seeds live far from run seeds so the two streams never coincide.
const NOISE_SEED_OFFSET: u64 = 1 << 32;

fn run_rng(cfg: &ExperimentConfig, run: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(cfg.seed.wrapping_add(run as u64))
}

/// Summary statistics for one setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupSummary {
    pub name: String,
    pub states: usize,
    /// `(mean, std)` of row-wise Gini over the TP matrix.
    pub tp_gini: (f64, f64),
    /// `(mean, std)` of row-wise Gini over the MFPT matrix (informal concentration measure).
    /// `None` above `ExperimentConfig::dense_max_states`.
    pub mfpt_gini: Option<(f64, f64)>,
    /// Stationary distribution. `None` above `ExperimentConfig::dense_max_states`.
    pub stationary: Option<Vec<f64>>,
    /// Largest finite-or-infinite minimum move count between two states (support-graph
    /// diameter). `None` above `ExperimentConfig::dense_max_states`.
    pub diameter: Option<f64>,
    /// Support in-degree of each state.
    pub in_degree: Vec<usize>,
    /// Unique fraction of each random walk.
    pub unique_fractions: Vec<f64>,
}

impl SetupSummary {
    /// `(mean, std)` of the random-walk unique fractions.
    pub fn unique_mean_std(&self) -> Option<(f64, f64)> {
        mean_std(&self.unique_fractions)
    }
}

/// TP matrix for `setup`: from the store if present, otherwise built and saved.
pub fn load_or_build_tp(setup: &Setup, store: &mut impl MatrixStore) -> Result<Array2<f64>> {
    let key = setup.tp_key();
    if let Some(tp) = store.load(&key)? {
        debug!(key = %key, "TP found in store");
        return from_external(tp);
    }
    let spec = setup.spec().ok_or_else(|| Error::MissingMatrix(key.clone()))?;
    let tp = build_tp(spec)?;
    store.save(&key, &tp.view())?;
    Ok(tp)
}

/// Matrix stored under `key`, or `compute()` saved under `key`. A stored matrix must have
/// shape `dim`.
fn load_or_compute(
    store: &mut impl MatrixStore,
    key: &str,
    dim: (usize, usize),
    compute: impl FnOnce() -> Result<Array2<f64>>,
) -> Result<Array2<f64>> {
    if let Some(m) = store.load(key)? {
        debug!(key = %key, "found in store");
        if m.dim() != dim {
            return Err(Error::DimensionMismatch("stored matrix has the wrong shape"));
        }
        return Ok(m);
    }
    let m = compute()?;
    store.save(key, &m.view())?;
    Ok(m)
}

/// MFPT matrix for `setup`: from the store if present, otherwise computed from `tp` and saved.
pub fn load_or_compute_mfpt(
    setup: &Setup,
    tp: &ArrayView2<f64>,
    store: &mut impl MatrixStore,
) -> Result<Array2<f64>> {
    load_or_compute(store, &setup.mfpt_key(), tp.dim(), || mfpt(tp))
}

/// Minimum move counts for `setup` (`INFINITY` where unreachable), cached like the MFPT.
pub fn load_or_compute_min_steps(
    setup: &Setup,
    tp: &ArrayView2<f64>,
    store: &mut impl MatrixStore,
) -> Result<Array2<f64>> {
    load_or_compute(store, &setup.sp_key(), tp.dim(), || min_steps(tp))
}

/// Stationary distribution for `setup`, cached as a `1 x N` matrix.
pub fn load_or_compute_stationary(
    setup: &Setup,
    tp: &ArrayView2<f64>,
    store: &mut impl MatrixStore,
) -> Result<Vec<f64>> {
    let row = load_or_compute(store, &setup.stationary_key(), (1, tp.nrows()), || {
        Ok(stationary(tp)?.insert_axis(Axis(0)))
    })?;
    Ok(row.row(0).to_vec())
}

/// Gini statistics and random-walk uniqueness for one setup.
pub fn summarize_setup(
    setup: &Setup,
    store: &mut impl MatrixStore,
    cfg: &ExperimentConfig,
) -> Result<SetupSummary> {
    let tp = load_or_build_tp(setup, store)?;
    let n = tp.nrows();
    let tp_gini = mu_sigma_gini(&tp.view())?;
    let degrees = in_degree(&tp.view())?;

    let (mfpt_gini, pi, diameter) = if n <= cfg.dense_max_states {
        let m = load_or_compute_mfpt(setup, &tp.view(), store)?;
        let sp = load_or_compute_min_steps(setup, &tp.view(), store)?;
        let pi = load_or_compute_stationary(setup, &tp.view(), store)?;
        let diameter = sp.iter().fold(0.0f64, |acc, &d| acc.max(d));
        (Some(mu_sigma_gini(&m.view())?), Some(pi), Some(diameter))
    } else {
        info!(
            setup = %setup.name(),
            states = n,
            max = cfg.dense_max_states,
            "skipping MFPT, shortest paths and stationary distribution"
        );
        (None, None, None)
    };

    // Walk as many steps as there are states: explorative operators still revisit states,
    // exploitative ones revisit far more.
    let mut unique_fractions = Vec::with_capacity(cfg.walk_reps);
    for r in 0..cfg.walk_reps {
        let mut rng = run_rng(cfg, r);
        let trajectory = walk(&tp.view(), n, None, &mut rng)?;
        unique_fractions.push(unique_fraction(&trajectory)?);
    }

    let summary = SetupSummary {
        name: setup.name(),
        states: n,
        tp_gini,
        mfpt_gini,
        stationary: pi,
        diameter,
        in_degree: degrees,
        unique_fractions,
    };
    info!(
        setup = %summary.name,
        states = n,
        mu_gini_tp = tp_gini.0,
        sigma_gini_tp = tp_gini.1,
        mu_gini_mfpt = mfpt_gini.map(|g| g.0),
        diameter,
        "summarized setup"
    );
    Ok(summary)
}

/// Summarize every setup in order. Stops at the first error.
pub fn sweep(
    setups: &[Setup],
    store: &mut impl MatrixStore,
    cfg: &ExperimentConfig,
) -> Result<Vec<SetupSummary>> {
    setups
        .iter()
        .map(|setup| summarize_setup(setup, store, cfg))
        .collect()
}

/// Hill-climb outcomes for one (pmut, noise level) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GaHillClimbCell {
    pub pmut: f64,
    /// Mean row-wise Gini of the (un-blended) per-gene TP matrix.
    pub mu_gini: f64,
    pub noise: usize,
    /// Best fitness of each run.
    pub bests: Vec<f64>,
}

/// Greedy hill-climbs on (noisy) OneMax for each per-gene mutation rate.
///
/// For a given noise level the same noisy landscape is used for every `pmut`, so the cells
/// differ only in the operator.
pub fn ga_hillclimb_experiment(cfg: &ExperimentConfig) -> Result<Vec<GaHillClimbCell>> {
    let length = cfg.ga_hc_length;
    let fitness = onemax(length)?;

    let landscapes: Vec<Vec<f64>> = cfg
        .noise_levels
        .iter()
        .enumerate()
        .map(|(k, &noise)| {
            let mut rng =
                ChaCha8Rng::seed_from_u64(cfg.seed.wrapping_add(NOISE_SEED_OFFSET + k as u64));
            permute_noise(&fitness, noise, &mut rng)
        })
        .collect();

    let mut cells = Vec::with_capacity(cfg.pmuts.len() * cfg.noise_levels.len());
    for &pmut in &cfg.pmuts {
        let tp = build_tp(RepresentationSpec::Ga {
            length,
            pmut,
            mutation: GaMutation::PerGene,
        })?;
        let (mu_gini, _) = mu_sigma_gini(&tp.view())?;
        let tp = uniformify(&tp.view(), cfg.uniformify)?;

        for (&noise, landscape) in cfg.noise_levels.iter().zip(&landscapes) {
            let mut bests = Vec::with_capacity(cfg.hc_reps);
            for r in 0..cfg.hc_reps {
                let mut rng = run_rng(cfg, r);
                let run = hillclimb(
                    &tp.view(),
                    landscape,
                    cfg.hc_steps,
                    None,
                    HillClimbStrategy::Greedy,
                    &mut rng,
                )?;
                bests.push(run.best);
            }
            debug!(pmut, noise, mu_gini, "finished hill-climb cell");
            cells.push(GaHillClimbCell {
                pmut,
                mu_gini,
                noise,
                bests,
            });
        }
    }
    info!(cells = cells.len(), "GA hill-climb experiment done");
    Ok(cells)
}

/// RMSE distance between two TSP operators.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDifference {
    pub a: TspMove,
    pub b: TspMove,
    pub rmse: f64,
}

/// Pairwise RMSE between the chains of `moves` on length-`length` permutations.
pub fn operator_difference(length: usize, moves: &[TspMove]) -> Result<Vec<OperatorDifference>> {
    let tps = moves
        .iter()
        .map(|&mv| build_tsp_tp(length, mv))
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::new();
    for i in 0..moves.len() {
        for j in i + 1..moves.len() {
            let rmse = rmse_distance(&tps[i].view(), &tps[j].view())?;
            info!(a = moves[i].name(), b = moves[j].name(), rmse, "operator difference");
            out.push(OperatorDifference {
                a: moves[i],
                b: moves[j],
                rmse,
            });
        }
    }
    Ok(out)
}

/// Gini statistics of one compound operator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSummary {
    pub moves: Vec<TspMove>,
    pub tp_gini: (f64, f64),
    pub mfpt_gini: (f64, f64),
}

impl CompoundSummary {
    /// `2opt+swap` style label.
    pub fn label(&self) -> String {
        self.moves
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Every non-empty subset of `moves`, mixed with uniform weights.
///
/// Subsets are ordered by size, then lexicographically by position in `moves`.
pub fn compound_operators(length: usize, moves: &[TspMove]) -> Result<Vec<CompoundSummary>> {
    let k = moves.len();
    if k == 0 || k >= usize::BITS as usize {
        return Err(Error::InvalidParameter("need between 1 and 63 moves"));
    }
    let tps = moves
        .iter()
        .map(|&mv| build_tsp_tp(length, mv))
        .collect::<Result<Vec<_>>>()?;

    let mut subsets: Vec<Vec<usize>> = (1usize..(1 << k))
        .map(|mask| (0..k).filter(|&i| mask & (1 << i) != 0).collect())
        .collect();
    subsets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut out = Vec::with_capacity(subsets.len());
    for subset in subsets {
        let views: Vec<ArrayView2<f64>> = subset.iter().map(|&i| tps[i].view()).collect();
        let tp = mix(&uniform_weights(views.len()), &views)?;
        let m = mfpt(&tp.view())?;
        let summary = CompoundSummary {
            moves: subset.iter().map(|&i| moves[i]).collect(),
            tp_gini: mu_sigma_gini(&tp.view())?,
            mfpt_gini: mu_sigma_gini(&m.view())?,
        };
        info!(
            operators = %summary.label(),
            mu_gini_tp = summary.tp_gini.0,
            mu_gini_mfpt = summary.mfpt_gini.0,
            "compound operator"
        );
        out.push(summary);
    }
    Ok(out)
}
