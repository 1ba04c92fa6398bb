//! `Matrix` — a two-dimensional matrix of reals.
//!
//! A thin newtype around `nalgebra::DMatrix<f64>`, sized for Jacobians
//! (`residuals × parameters`) and the normal-equation systems built from
//! them.

use crate::array::Array;
use heston_core::Real;
use nalgebra::DMatrix;
use std::ops::{Index, IndexMut};

/// A dynamically-sized 2D matrix of `Real` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix(DMatrix<Real>);

impl Matrix {
    /// Create a zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }

    /// Build a matrix whose `j`-th column is `columns[j]`.
    ///
    /// All columns must have the same length.
    pub fn from_columns(columns: &[Array]) -> Self {
        let rows = columns.first().map_or(0, Array::size);
        Self(DMatrix::from_fn(rows, columns.len(), |i, j| columns[j][i]))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Borrow the inner `DMatrix`.
    pub fn inner(&self) -> &DMatrix<Real> {
        &self.0
    }

    /// Extract a column as an `Array`.
    pub fn column(&self, j: usize) -> Array {
        Array::from(self.0.column(j).clone_owned())
    }

    /// Set every entry of column `j` to zero.
    pub fn zero_column(&mut self, j: usize) {
        self.0.column_mut(j).fill(0.0);
    }

    /// Return `true` if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Gram matrix `Mᵗ·M`.
    pub fn gram(&self) -> Self {
        Self(self.0.tr_mul(&self.0))
    }

    /// `Mᵗ·v`.
    pub fn transpose_mul_vec(&self, v: &Array) -> Array {
        Array::from(self.0.tr_mul(v.inner()))
    }

    /// Matrix-vector product `M·v`.
    pub fn mul_vec(&self, v: &Array) -> Array {
        Array::from(&self.0 * v.inner())
    }

    /// Solve `M·x = rhs` for symmetric positive-definite `M` by Cholesky
    /// factorisation.
    ///
    /// Returns `None` when the factorisation breaks down or the solution is
    /// not finite.
    pub fn cholesky_solve(&self, rhs: &Array) -> Option<Array> {
        let chol = self.0.clone().cholesky()?;
        let x = chol.solve(rhs.inner());
        x.iter().all(|v| v.is_finite()).then(|| Array::from(x))
    }
}

// ── Indexing ──────────────────────────────────────────────────────────────────

impl Index<(usize, usize)> for Matrix {
    type Output = Real;
    fn index(&self, (i, j): (usize, usize)) -> &Real {
        &self.0[(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Real {
        &mut self.0[(i, j)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn columns(cols: &[&[Real]]) -> Matrix {
        Matrix::from_columns(&cols.iter().map(|c| Array::from_slice(c)).collect::<Vec<_>>())
    }

    #[test]
    fn from_columns_layout() {
        let m = Matrix::from_columns(&[
            Array::from_slice(&[1.0, 2.0, 3.0]),
            Array::from_slice(&[4.0, 5.0, 6.0]),
        ]);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(m[(2, 0)], 3.0);
        assert_eq!(m[(0, 1)], 4.0);
        assert_eq!(m.column(1), Array::from_slice(&[4.0, 5.0, 6.0]));
    }

    #[test]
    fn gram_and_transpose_product() {
        let m = columns(&[&[1.0, 3.0, 5.0], &[2.0, 4.0, 6.0]]);
        let g = m.gram();
        assert_eq!(g[(0, 0)], 35.0);
        assert_eq!(g[(0, 1)], 44.0);
        assert_eq!(g[(1, 0)], 44.0);
        assert_eq!(g[(1, 1)], 56.0);
        let v = Array::from_slice(&[1.0, 1.0, 1.0]);
        assert_eq!(m.transpose_mul_vec(&v), Array::from_slice(&[9.0, 12.0]));
        assert_eq!(m.mul_vec(&Array::from_slice(&[1.0, 1.0])), Array::from_slice(&[3.0, 7.0, 11.0]));
    }

    #[test]
    fn zero_column_clears_entries() {
        let mut m = columns(&[&[1.0, 3.0], &[2.0, 4.0]]);
        m.zero_column(0);
        assert_eq!(m.column(0), Array::zeros(2));
        assert_eq!(m.column(1), Array::from_slice(&[2.0, 4.0]));
        assert!(m.is_finite());
    }

    #[test]
    fn cholesky_solves_spd_system() {
        let m = columns(&[&[4.0, 2.0], &[2.0, 3.0]]);
        let x = m.cholesky_solve(&Array::from_slice(&[2.0, 1.0])).unwrap();
        assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-14);
        assert_abs_diff_eq!(x[1], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let m = columns(&[&[1.0, 2.0], &[2.0, 1.0]]);
        assert!(m.cholesky_solve(&Array::from_slice(&[1.0, 1.0])).is_none());
        assert!(Matrix::zeros(2, 2)
            .cholesky_solve(&Array::from_slice(&[1.0, 1.0]))
            .is_none());
        let identity = columns(&[&[1.0, 0.0], &[0.0, 1.0]]);
        assert!(identity.cholesky_solve(&Array::zeros(2)).is_some());
    }
}
