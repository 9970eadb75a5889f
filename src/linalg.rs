//! Dense linear algebra for the chain computations.
//!
//! State spaces are capped at [`crate::MAX_STATES`], so direct dense solving is enough. This is
//! plain LU with partial pivoting on `ndarray` storage; no BLAS/LAPACK backend is required.

use crate::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Pivots with magnitude at or below this are treated as zero (the matrix is singular).
pub const PIVOT_EPS: f64 = 1e-12;

/// `PA = LU` with unit-diagonal `L` and `U` packed into one matrix.
#[derive(Debug, Clone)]
pub struct Lu {
    lu: Array2<f64>,
    perm: Vec<usize>,
}

impl Lu {
    /// Factor a square matrix.
    ///
    /// - [`Error::DimensionMismatch`]: `a` is not square.
    /// - [`Error::SingularMatrix`]: some pivot is at or below `PIVOT_EPS` (relative to the
    ///   largest entry).
    pub fn factor(a: &ArrayView2<f64>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(Error::DimensionMismatch("LU needs a square matrix"));
        }
        let mut lu = a.to_owned();
        let mut perm: Vec<usize> = (0..n).collect();

        // Scale the singularity threshold to the matrix magnitude.
        let scale = lu.iter().fold(0.0f64, |m, &x| m.max(x.abs())).max(1.0);

        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_abs = lu[[k, k]].abs();
            for i in k + 1..n {
                let v = lu[[i, k]].abs();
                if v > pivot_abs {
                    pivot_abs = v;
                    pivot_row = i;
                }
            }
            if !(pivot_abs > PIVOT_EPS * scale) {
                return Err(Error::SingularMatrix("pivot below threshold"));
            }
            if pivot_row != k {
                for j in 0..n {
                    lu.swap([k, j], [pivot_row, j]);
                }
                perm.swap(k, pivot_row);
            }

            let pivot = lu[[k, k]];
            for i in k + 1..n {
                let factor = lu[[i, k]] / pivot;
                lu[[i, k]] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in k + 1..n {
                    lu[[i, j]] -= factor * lu[[k, j]];
                }
            }
        }
        Ok(Self { lu, perm })
    }

    pub fn dim(&self) -> usize {
        self.perm.len()
    }

    /// Solve `A x = b`.
    pub fn solve(&self, b: &ArrayView1<f64>) -> Array1<f64> {
        let n = self.dim();
        debug_assert_eq!(b.len(), n);

        // Forward substitution on the permuted right-hand side.
        let mut x = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut s = b[self.perm[i]];
            for j in 0..i {
                s -= self.lu[[i, j]] * x[j];
            }
            x[i] = s;
        }
        // Back substitution.
        for i in (0..n).rev() {
            let mut s = x[i];
            for j in i + 1..n {
                s -= self.lu[[i, j]] * x[j];
            }
            x[i] = s / self.lu[[i, i]];
        }
        x
    }

    /// `A^{-1}`, one column at a time.
    pub fn inverse(&self) -> Array2<f64> {
        let n = self.dim();
        let mut inv = Array2::<f64>::zeros((n, n));
        let mut e = Array1::<f64>::zeros(n);
        for j in 0..n {
            e.fill(0.0);
            e[j] = 1.0;
            let col = self.solve(&e.view());
            inv.column_mut(j).assign(&col);
        }
        inv
    }
}
