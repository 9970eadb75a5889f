//! One entry point over all supported (representation, operator) pairs.

use crate::ga::{build_ga_tp, ga_state_count, GaMutation};
use crate::transition::from_external;
use crate::tsp::{build_tsp_tp, tsp_state_count, TspMove};
use crate::Result;
use ndarray::Array2;

/// Which chain to build.
#[derive(Debug, Clone, PartialEq)]
pub enum RepresentationSpec {
    /// Bitstrings of `length` bits under bit-flip mutation.
    Ga {
        length: usize,
        pmut: f64,
        mutation: GaMutation,
    },
    /// Permutations of `0..length` under one move type.
    Tsp { length: usize, mv: TspMove },
    /// A matrix built elsewhere (e.g. GP trees); validated and passed through.
    External(Array2<f64>),
}

impl RepresentationSpec {
    /// Size of the state space, without building anything.
    pub fn state_count(&self) -> Result<usize> {
        match self {
            RepresentationSpec::Ga { length, .. } => ga_state_count(*length),
            RepresentationSpec::Tsp { length, mv } => tsp_state_count(*length, *mv),
            RepresentationSpec::External(m) => Ok(m.nrows()),
        }
    }
}

/// Build (or, for `External`, validate) the TP matrix described by `spec`.
pub fn build_tp(spec: RepresentationSpec) -> Result<Array2<f64>> {
    match spec {
        RepresentationSpec::Ga {
            length,
            pmut,
            mutation,
        } => build_ga_tp(length, pmut, mutation),
        RepresentationSpec::Tsp { length, mv } => build_tsp_tp(length, mv),
        RepresentationSpec::External(m) => from_external(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use ndarray::array;

    #[test]
    fn dispatches_to_each_builder() -> Result<()> {
        let ga = RepresentationSpec::Ga {
            length: 3,
            pmut: 0.5,
            mutation: GaMutation::PerGene,
        };
        assert_eq!(ga.state_count()?, 8);
        assert_eq!(build_tp(ga)?.dim(), (8, 8));

        let tsp = RepresentationSpec::Tsp {
            length: 4,
            mv: TspMove::TwoOpt,
        };
        assert_eq!(tsp.state_count()?, 24);
        assert_eq!(build_tp(tsp)?.dim(), (24, 24));

        let ext = array![[0.0, 1.0], [1.0, 0.0]];
        assert_eq!(build_tp(RepresentationSpec::External(ext.clone()))?, ext);
        Ok(())
    }

    #[test]
    fn external_input_is_checked() {
        let bad = array![[0.9, 0.0], [1.0, 0.0]];
        assert!(matches!(
            build_tp(RepresentationSpec::External(bad)),
            Err(Error::InvalidTransitionMatrix { row: 0, .. })
        ));
    }
}
