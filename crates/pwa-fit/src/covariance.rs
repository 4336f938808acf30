//! Covariance of production amplitudes and of spin-density matrix elements.

use nalgebra::{DMatrix, Matrix2, RowVector2};
use pwa_core::{AmplitudeIndex, WaveIndex};
use tracing::warn;

use crate::linalg::{conjugation, matrix_repr, sandwich, set_block};
use crate::result::FitResult;

impl FitResult {
    /// Covariance matrix of the real and imaginary parts of the listed
    /// amplitudes.
    ///
    /// Layout for amplitudes `A0 .. A(n-1)` is `(A0.re, A0.im, A1.re, ...)` on
    /// both axes. Parts that are fixed in the fit keep zero rows and columns.
    pub fn prod_amp_cov(&self, amps: &[AmplitudeIndex]) -> DMatrix<f64> {
        let dim = 2 * amps.len();
        let mut cov = DMatrix::zeros(dim, dim);
        if !self.has_errors {
            warn!("fit result does not have a valid error matrix, returning zero covariance matrix");
            return cov;
        }
        let par_indices: Vec<_> = amps
            .iter()
            .flat_map(|amp| {
                let indices = self.fit_par_cov_indices[amp.as_raw()];
                [indices.re, indices.im]
            })
            .collect();
        for (row, i) in par_indices.iter().enumerate() {
            let Some(i) = i else { continue };
            for (col, j) in par_indices.iter().enumerate() {
                if let Some(j) = j {
                    cov[(row, col)] = self.fit_parameter_cov(*i, *j);
                }
            }
        }
        cov
    }

    /// Amplitude covariance for rank-matched pairs, laid out as all first
    /// members followed by all second members.
    pub fn prod_amp_cov_for_pairs(&self, pairs: &[(AmplitudeIndex, AmplitudeIndex)]) -> DMatrix<f64> {
        let amps: Vec<_> = pairs
            .iter()
            .map(|(a, _)| *a)
            .chain(pairs.iter().map(|(_, b)| *b))
            .collect();
        self.prod_amp_cov(&amps)
    }

    /// 2x2 covariance of `(Re ρ_AB, Im ρ_AB)`.
    ///
    /// With `ρ_AB = Σ_r V_Ar V_Br*` the Jacobian is `(J_A0 .. J_A(m-1), J_B0 ..
    /// J_B(m-1))` where `J_Ar = M(V_Br*)` and `J_Br = M(V_Ar) · diag(1, -1)`;
    /// the conjugation of `V_Br` is not analytic.
    pub fn spin_density_matrix_elem_cov(&self, a: WaveIndex, b: WaveIndex) -> Matrix2<f64> {
        let pairs = self.prod_amp_index_pairs_for_waves(a, b);
        if !self.has_errors || pairs.is_empty() {
            return Matrix2::zeros();
        }
        let amp_cov = self.prod_amp_cov_for_pairs(&pairs);
        let mut jacobian = DMatrix::zeros(2, amp_cov.ncols());
        let col_offset = 2 * pairs.len();
        for (i, (amp_a, amp_b)) in pairs.iter().enumerate() {
            let sub_a = matrix_repr(self.prod_amps[amp_b.as_raw()].conj());
            set_block(&mut jacobian, 0, 2 * i, &sub_a);
            let sub_b = matrix_repr(self.prod_amps[amp_a.as_raw()]) * conjugation();
            set_block(&mut jacobian, 0, col_offset + 2 * i, &sub_b);
        }
        let cov = sandwich(&jacobian, &amp_cov);
        Matrix2::new(cov[(0, 0)], cov[(0, 1)], cov[(1, 0)], cov[(1, 1)])
    }

    /// Variance of a real function of `ρ_AB` given its 1x2 Jacobian with
    /// respect to `(Re ρ_AB, Im ρ_AB)`.
    pub fn real_val_variance(&self, a: WaveIndex, b: WaveIndex, jacobian: &RowVector2<f64>) -> f64 {
        let cov = self.spin_density_matrix_elem_cov(a, b);
        (jacobian * cov * jacobian.transpose())[(0, 0)]
    }
}
