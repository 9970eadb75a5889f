//! # opchain
//!
//! Exploration vs. exploitation of neighbourhood operators, measured as Markov chains.
//!
//! A search-space representation (bitstrings, permutations, trees) plus a neighbourhood
//! operator induces a discrete-time Markov chain over the enumerated search space. This crate:
//!
//! - builds the **transition-probability (TP) matrix** for a (representation, operator) pair,
//! - derives summary statistics from it (row-wise Gini coefficient, mean first passage times,
//!   stationary distribution),
//! - mixes several operators into a **compound operator** and compares operators by RMSE,
//! - runs seeded **random walks** and **hill-climbs** to check those statistics empirically.
//!
//! ## Public invariants (must not change)
//!
//! - **TP matrices are row-stochastic**: every builder and the mixer return matrices whose rows
//!   sum to 1 within [`ROW_SUM_TOL`], with entries in `[0, 1]`.
//! - **Randomness is injected**: simulators take `&mut impl rand::Rng`; nothing reads ambient
//!   global RNG state. Tests use `rand_chacha::ChaCha8Rng::seed_from_u64`.
//! - **Enumeration is bounded**: state spaces above [`MAX_STATES`] fail with
//!   [`Error::StateSpaceTooLarge`] before anything is allocated.
//! - **No hidden normalization**: nothing renormalizes a caller's matrix or weights. If an input
//!   is not a distribution, the function errors.
//!
//! ## State-space encodings
//!
//! - Bitstrings of length `L`: state `i` has bit `k` equal to `(i >> k) & 1`.
//! - Permutations of `0..L`: state `i` is the `i`-th permutation in lexicographic order.
//!   No rotation/reflection canonicalization is applied, so there are `L!` states.
//! - Trees: enumerated outside this crate; their TP matrices come in through
//!   [`transition::from_external`].
//!
//! ## Module map
//!
//! - `gini`: Gini coefficient of a weight vector; per-row mean/std over a matrix
//! - `ga`, `tsp`: TP builders for bitstring mutation and permutation moves
//! - `transition`: TP validation, pass-through ingestion, uniformification
//! - `representation`: `build_tp` dispatcher over representation specs
//! - `markov`: support graph, communicating classes, stationary distribution, MFPT,
//!   minimum steps, in-degree
//! - `linalg`: dense LU with partial pivoting (small, explicit)
//! - `compound`: convex mixtures of TP matrices
//! - `metrics`: RMSE distance between operators
//! - `walk`, `hillclimb`, `fitness`: simulators and fitness-vector helpers
//! - `store`, `experiment`: matrix persistence interface and the experiment sweeps

pub mod compound;
pub mod experiment;
pub mod fitness;
pub mod ga;
pub mod gini;
pub mod hillclimb;
pub mod linalg;
pub mod markov;
pub mod metrics;
pub mod representation;
pub mod store;
pub mod transition;
pub mod tsp;
pub mod walk;

pub use compound::mix;
pub use ga::{build_ga_tp, GaMutation};
pub use gini::{gini, mu_sigma_gini};
pub use hillclimb::{hillclimb, HillClimbResult, HillClimbStrategy};
pub use markov::{mfpt, stationary};
pub use metrics::rmse_distance;
pub use representation::{build_tp, RepresentationSpec};
pub use tsp::{build_tsp_tp, TspMove};
pub use walk::{unique_fraction, walk};

/// Tolerance used when checking that a TP row (or a weight vector) sums to 1.
pub const ROW_SUM_TOL: f64 = 1e-6;

/// Largest state space any builder will enumerate (`8!`).
///
/// This bounds enumeration, not memory. Matrices are dense `f64`, so one `N x N` matrix at the
/// ceiling is about 13 GB, and `mfpt` holds several of them at once. Stationary/MFPT solves are
/// `O(N^3)`; in practice they stay below `7! = 5040` states (see
/// `experiment::ExperimentConfig::dense_max_states`).
pub const MAX_STATES: usize = 40_320;

/// opchain error variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("invalid distribution: {0}")]
    InvalidDistribution(&'static str),
    #[error("invalid weights: {0}")]
    InvalidWeights(&'static str),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(&'static str),
    #[error("reducible chain: {0}")]
    ReducibleChain(&'static str),
    #[error("singular matrix: {0}")]
    SingularMatrix(&'static str),
    #[error("state space too large: {states} states exceeds the ceiling of {max}")]
    StateSpaceTooLarge { states: usize, max: usize },
    #[error("invalid transition matrix (row {row}): {reason}")]
    InvalidTransitionMatrix { row: usize, reason: &'static str },
    #[error("matrix not found in store: {0}")]
    MissingMatrix(String),
    #[error("malformed matrix file: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
