//! Transition-probability (TP) matrix contract.
//!
//! Convention: row `i` is the distribution of the next state given current state `i`,
//! so a TP matrix `P` evolves a row-vector distribution as `p_next = p P`.
//!
//! Public invariant: `validate_tp` never repairs a matrix. Functions that change a matrix say so
//! in their name (`uniformify`).

use crate::{Error, Result, ROW_SUM_TOL};
use ndarray::{Array2, ArrayView2};

/// Check that `tp` is square and non-empty; returns `N`.
pub(crate) fn check_square(tp: &ArrayView2<f64>) -> Result<usize> {
    let n = tp.nrows();
    if tp.ncols() != n {
        return Err(Error::DimensionMismatch("transition matrix must be square"));
    }
    if n == 0 {
        return Err(Error::InvalidParameter("transition matrix must be non-empty"));
    }
    Ok(n)
}

/// Validate the row-stochastic invariant:
/// - square and non-empty
/// - every entry finite and in `[0, 1]`
/// - every row sums to 1 (within `tol`)
pub fn validate_tp(tp: &ArrayView2<f64>, tol: f64) -> Result<()> {
    check_square(tp)?;
    if !(tol >= 0.0) || !tol.is_finite() {
        return Err(Error::InvalidParameter("tol must be finite and >= 0"));
    }

    for (i, row) in tp.rows().into_iter().enumerate() {
        let mut sum = 0.0f64;
        for &v in row.iter() {
            if !v.is_finite() {
                return Err(Error::InvalidTransitionMatrix {
                    row: i,
                    reason: "non-finite entry",
                });
            }
            if v < 0.0 {
                return Err(Error::InvalidTransitionMatrix {
                    row: i,
                    reason: "negative entry",
                });
            }
            if v > 1.0 + tol {
                return Err(Error::InvalidTransitionMatrix {
                    row: i,
                    reason: "entry greater than 1",
                });
            }
            sum += v;
        }
        if (sum - 1.0).abs() > tol {
            return Err(Error::InvalidTransitionMatrix {
                row: i,
                reason: "row does not sum to 1 (within tol)",
            });
        }
    }
    Ok(())
}

/// Pass-through builder for matrices produced outside this crate (e.g. the tree/GP pipeline).
///
/// The matrix is validated with [`ROW_SUM_TOL`] and returned unchanged.
pub fn from_external(tp: Array2<f64>) -> Result<Array2<f64>> {
    validate_tp(&tp.view(), ROW_SUM_TOL)?;
    Ok(tp)
}

/// Blend a TP matrix towards the uniform chain: `(1 - alpha) P + alpha / N`.
///
/// `alpha = 0` returns a copy of `P`; `alpha = 1` is the uniform chain (every state reachable
/// in one step, self included). The result is validated before it is returned.
pub fn uniformify(tp: &ArrayView2<f64>, alpha: f64) -> Result<Array2<f64>> {
    let n = check_square(tp)?;
    if !(0.0..=1.0).contains(&alpha) || !alpha.is_finite() {
        return Err(Error::InvalidParameter("alpha must be in [0,1]"));
    }
    let floor = alpha / n as f64;
    let out = tp.mapv(|p| (1.0 - alpha) * p + floor);
    validate_tp(&out.view(), ROW_SUM_TOL)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn external_matrix_passes_through_unchanged() -> Result<()> {
        let tp = array![[0.0, 1.0, 0.0], [0.25, 0.5, 0.25], [0.0, 0.0, 1.0]];
        let out = from_external(tp.clone())?;
        assert_eq!(out, tp);
        Ok(())
    }

    #[test]
    fn bad_rows_are_reported_by_index() {
        let short = array![[0.5, 0.5], [0.5, 0.4]];
        match from_external(short) {
            Err(Error::InvalidTransitionMatrix { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected InvalidTransitionMatrix, got {other:?}"),
        }

        let negative = array![[1.2, -0.2], [0.5, 0.5]];
        match from_external(negative) {
            Err(Error::InvalidTransitionMatrix { row, reason }) => {
                assert_eq!(row, 0);
                assert_eq!(reason, "negative entry");
            }
            other => panic!("expected InvalidTransitionMatrix, got {other:?}"),
        }

        let rect = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            from_external(rect),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn empty_matrix_is_the_same_error_everywhere() {
        let empty = Array2::<f64>::zeros((0, 0));
        assert!(matches!(
            validate_tp(&empty.view(), ROW_SUM_TOL),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            check_square(&empty.view()),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            uniformify(&empty.view(), 0.5),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn tolerance_is_one_in_a_million() {
        let near = array![[0.5, 0.5 + 5e-7], [1.0, 0.0]];
        assert!(from_external(near).is_ok());
        let off = array![[0.5, 0.5 + 5e-6], [1.0, 0.0]];
        assert!(from_external(off).is_err());
    }

    #[test]
    fn uniformify_endpoints() -> Result<()> {
        let tp = array![[0.0, 1.0], [1.0, 0.0]];
        assert_eq!(uniformify(&tp.view(), 0.0)?, tp);
        let u = uniformify(&tp.view(), 1.0)?;
        assert!(u.iter().all(|&p| (p - 0.5).abs() < 1e-15));
        let half = uniformify(&tp.view(), 0.5)?;
        assert!((half[[0, 0]] - 0.25).abs() < 1e-15);
        assert!((half[[0, 1]] - 0.75).abs() < 1e-15);
        assert!(uniformify(&tp.view(), 1.5).is_err());
        Ok(())
    }
}
