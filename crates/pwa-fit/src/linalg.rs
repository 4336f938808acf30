//! Small dense-matrix helpers used to linearise complex products.
//!
//! Dimension agreement between the supplied matrices is the caller's
//! precondition; nalgebra panics on mismatched shapes.

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

/// Real 2x2 representation of multiplication by `z`.
///
/// Acting on `(Re w, Im w)` it yields `(Re zw, Im zw)`:
/// `[[Re z, -Im z], [Im z, Re z]]`.
pub fn matrix_repr(z: Complex64) -> Matrix2<f64> {
    Matrix2::new(z.re, -z.im, z.im, z.re)
}

/// `diag(1, -1)`, the real representation of complex conjugation.
pub fn conjugation() -> Matrix2<f64> {
    Matrix2::new(1.0, 0.0, 0.0, -1.0)
}

/// Copies a 2x2 block into `target` with its upper-left corner at `(row, col)`.
pub fn set_block(target: &mut DMatrix<f64>, row: usize, col: usize, block: &Matrix2<f64>) {
    target.fixed_view_mut::<2, 2>(row, col).copy_from(block);
}

/// Computes `J · C · Jᵀ`.
///
/// For a `k x n` Jacobian and an `n x n` covariance the result is `k x k`;
/// `k` is 1 for real-valued quantities and 2 for complex ones.
pub fn sandwich(jacobian: &DMatrix<f64>, covariance: &DMatrix<f64>) -> DMatrix<f64> {
    let cov_jt = covariance * jacobian.transpose();
    jacobian * cov_jt
}

/// Scalar variance `J · C · Jᵀ` for a single-row Jacobian.
pub fn scalar_variance(jacobian: &DMatrix<f64>, covariance: &DMatrix<f64>) -> f64 {
    debug_assert_eq!(jacobian.nrows(), 1);
    sandwich(jacobian, covariance)[(0, 0)]
}
