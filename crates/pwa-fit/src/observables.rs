//! Physical observables of a fit result and their first-order uncertainties.
//!
//! Every error follows `Var(f) = J · Cov · Jᵀ`. Queries never fail: missing
//! covariance, unknown names and the flat wave yield 0 and a warning where the
//! condition is unexpected.

use nalgebra::{DMatrix, RowVector2};
use num_complex::Complex64;
use pwa_core::{AmplitudeIndex, WaveIndex};
use tracing::warn;

use crate::linalg::scalar_variance;
use crate::names::{FitParameterName, ParameterPart};
use crate::result::FitResult;

impl FitResult {
    fn errors_available(&self, query: &str) -> bool {
        if !self.has_errors {
            warn!(query, "fit result does not have a valid error matrix, returning zero error");
        }
        self.has_errors
    }

    fn involves_flat(&self, a: WaveIndex, b: WaveIndex) -> bool {
        a != b && (self.is_flat_wave(a) || self.is_flat_wave(b))
    }

    /// Spin-density matrix element `ρ_AB = Σ_r V_Ar V_Br*`, summed over ranks
    /// present in both waves.
    pub fn spin_density_matrix_elem(&self, a: WaveIndex, b: WaveIndex) -> Complex64 {
        self.prod_amp_index_pairs_for_waves(a, b)
            .iter()
            .map(|(amp_a, amp_b)| self.prod_amps[amp_a.as_raw()] * self.prod_amps[amp_b.as_raw()].conj())
            .sum()
    }

    /// Intensity of a single wave, `ρ_AA`.
    pub fn wave_intensity(&self, wave: WaveIndex) -> f64 {
        self.spin_density_matrix_elem(wave, wave).re
    }

    /// Total intensity of all waves whose name contains `pattern`, including
    /// their pairwise overlaps.
    ///
    /// Each unordered pair contributes `overlap(i, j)` once; the factor 2 of
    /// the interference term is already part of [`FitResult::overlap`].
    pub fn intensity(&self, pattern: &str) -> f64 {
        let waves = self.wave_indices_matching_pattern(pattern);
        let mut intensity = 0.0;
        for (i, wave_i) in waves.iter().enumerate() {
            intensity += self.wave_intensity(*wave_i);
            for wave_j in &waves[..i] {
                intensity += self.overlap(*wave_i, *wave_j);
            }
        }
        intensity
    }

    /// Error of [`FitResult::intensity`] for the same pattern.
    ///
    /// Propagated on amplitude level using
    /// `I = Σ_r Σ_ij V_ir V_jr* N_ij`.
    pub fn intensity_err(&self, pattern: &str) -> f64 {
        if !self.errors_available("intensity_err") {
            return 0.0;
        }
        let amps = self.prod_amp_indices_matching_pattern(pattern);
        self.intensity_err_for_amps(&amps)
    }

    /// Error of [`FitResult::wave_intensity`].
    pub fn wave_intensity_err(&self, wave: WaveIndex) -> f64 {
        if !self.errors_available("wave_intensity_err") {
            return 0.0;
        }
        let amps = self.prod_amp_indices_for_wave(wave);
        self.intensity_err_for_amps(&amps)
    }

    fn intensity_err_for_amps(&self, amps: &[AmplitudeIndex]) -> f64 {
        if amps.is_empty() {
            return 0.0;
        }
        // dI / d(Re V_i, Im V_i) = 2 (Re, Im) of Σ_j V_j N_ji over same-rank j
        let mut jacobian = DMatrix::zeros(1, 2 * amps.len());
        for (i, amp_i) in amps.iter().enumerate() {
            let rank_i = self.rank_of_prod_amp(*amp_i);
            let amp_norm: Complex64 = amps
                .iter()
                .filter(|amp_j| self.rank_of_prod_amp(**amp_j) == rank_i)
                .map(|amp_j| self.prod_amps[amp_j.as_raw()] * self.norm_integral_for_prod_amp(*amp_j, *amp_i))
                .sum();
            jacobian[(0, 2 * i)] = 2.0 * amp_norm.re;
            jacobian[(0, 2 * i + 1)] = 2.0 * amp_norm.im;
        }
        let amp_cov = self.prod_amp_cov(amps);
        scalar_variance(&jacobian, &amp_cov).max(0.0).sqrt()
    }

    /// Phase of `ρ_AB` in degrees; 0 for `A == B` and for the flat wave.
    pub fn phase(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if a == b || self.involves_flat(a, b) {
            return 0.0;
        }
        self.spin_density_matrix_elem(a, b).arg().to_degrees()
    }

    /// Error of [`FitResult::phase`] in degrees.
    pub fn phase_err(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if !self.errors_available("phase_err") || a == b || self.involves_flat(a, b) {
            return 0.0;
        }
        let rho = self.spin_density_matrix_elem(a, b);
        let (x, y) = (rho.re, rho.im);
        let mut jacobian = RowVector2::zeros();
        if x != 0.0 || y != 0.0 {
            jacobian[0] = 1.0 / (x + y * y / x);
            jacobian[1] = -y / (x * x + y * y);
        }
        self.real_val_variance(a, b, &jacobian).max(0.0).sqrt().to_degrees()
    }

    /// Coherence `sqrt(|ρ_AB|² / (ρ_AA ρ_BB))`; 0 if either intensity vanishes.
    pub fn coherence(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if self.involves_flat(a, b) {
            return 0.0;
        }
        let rho_aa = self.wave_intensity(a);
        let rho_bb = self.wave_intensity(b);
        if rho_aa * rho_bb == 0.0 {
            return 0.0;
        }
        let rho_ab = self.spin_density_matrix_elem(a, b);
        (rho_ab.norm_sqr() / (rho_aa * rho_bb)).sqrt()
    }

    /// Error of [`FitResult::coherence`].
    ///
    /// The Jacobian runs over every amplitude of both waves; each amplitude is
    /// paired with the same-rank amplitude of the other wave, or zero if that
    /// wave has none.
    pub fn coherence_err(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if !self.errors_available("coherence_err") || self.involves_flat(a, b) {
            return 0.0;
        }
        let amps_a = self.prod_amp_indices_for_wave(a);
        let amps_b = self.prod_amp_indices_for_wave(b);
        if amps_a.is_empty() || amps_b.is_empty() {
            return 0.0;
        }
        let rho_aa = self.wave_intensity(a);
        let rho_bb = self.wave_intensity(b);
        let rho_ab = self.spin_density_matrix_elem(a, b);
        let rho_ab_norm = rho_ab.norm_sqr();
        let coh = self.coherence(a, b);
        if coh == 0.0 {
            return 0.0;
        }

        let same_rank_partner = |amp: AmplitudeIndex, others: &[AmplitudeIndex]| -> Complex64 {
            let rank = self.rank_of_prod_amp(amp);
            others
                .iter()
                .find(|other| self.rank_of_prod_amp(**other) == rank)
                .map_or(Complex64::new(0.0, 0.0), |other| self.prod_amps[other.as_raw()])
        };

        let mut jacobian = DMatrix::zeros(1, 2 * (amps_a.len() + amps_b.len()));
        for (i, amp) in amps_a.iter().enumerate() {
            let v_a = self.prod_amps[amp.as_raw()];
            let v_b = same_rank_partner(*amp, &amps_b);
            jacobian[(0, 2 * i)] =
                rho_ab.re * v_b.re - rho_ab.im * v_b.im - (rho_ab_norm / rho_aa) * v_a.re;
            jacobian[(0, 2 * i + 1)] =
                rho_ab.re * v_b.im + rho_ab.im * v_b.re - (rho_ab_norm / rho_aa) * v_a.im;
        }
        let col_offset = 2 * amps_a.len();
        for (i, amp) in amps_b.iter().enumerate() {
            let v_b = self.prod_amps[amp.as_raw()];
            let v_a = same_rank_partner(*amp, &amps_a);
            jacobian[(0, col_offset + 2 * i)] =
                rho_ab.re * v_a.re + rho_ab.im * v_a.im - (rho_ab_norm / rho_bb) * v_b.re;
            jacobian[(0, col_offset + 2 * i + 1)] =
                rho_ab.re * v_a.im - rho_ab.im * v_a.re - (rho_ab_norm / rho_bb) * v_b.im;
        }
        jacobian *= 1.0 / (coh * rho_aa * rho_bb);

        let amps: Vec<_> = amps_a.iter().chain(amps_b.iter()).copied().collect();
        let amp_cov = self.prod_amp_cov(&amps);
        scalar_variance(&jacobian, &amp_cov).max(0.0).sqrt()
    }

    /// Interference term `2 Re(ρ_AB N_AB)` of waves A and B.
    pub fn overlap(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if self.involves_flat(a, b) {
            return 0.0;
        }
        let rho = self.spin_density_matrix_elem(a, b);
        let norm = self.norm_integral(a, b);
        2.0 * (rho * norm).re
    }

    /// Error of [`FitResult::overlap`].
    pub fn overlap_err(&self, a: WaveIndex, b: WaveIndex) -> f64 {
        if !self.errors_available("overlap_err") || self.involves_flat(a, b) {
            return 0.0;
        }
        let norm = self.norm_integral(a, b);
        let jacobian = RowVector2::new(2.0 * norm.re, -2.0 * norm.im);
        self.real_val_variance(a, b, &jacobian).max(0.0).sqrt()
    }

    fn lookup_parameter(&self, name: &str) -> Option<(AmplitudeIndex, ParameterPart)> {
        let parsed = match FitParameterName::parse(name) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(parameter = name, error = %err, "could not parse parameter name");
                return None;
            }
        };
        match self.amp_names.iter().position(|amp| *amp == parsed.amplitude) {
            Some(i) => Some((AmplitudeIndex::from_raw(i), parsed.part)),
            None => {
                warn!(parameter = name, "could not find any parameter with this name");
                None
            }
        }
    }

    /// Value of a fit parameter such as `V0_<wave>_RE`, `V1_<wave>_IM` or
    /// `V_flat`; 0 with a warning when no amplitude matches.
    pub fn fit_parameter(&self, name: &str) -> f64 {
        match self.lookup_parameter(name) {
            Some((amp, ParameterPart::Real)) => self.prod_amps[amp.as_raw()].re,
            Some((amp, ParameterPart::Imag)) => self.prod_amps[amp.as_raw()].im,
            None => 0.0,
        }
    }

    /// Standard error of [`FitResult::fit_parameter`]; 0 for fixed parameters
    /// and without a valid covariance matrix.
    pub fn fit_parameter_err(&self, name: &str) -> f64 {
        if !self.errors_available("fit_parameter_err") {
            return 0.0;
        }
        let Some((amp, part)) = self.lookup_parameter(name) else {
            return 0.0;
        };
        let indices = self.fit_par_cov_indices[amp.as_raw()];
        let row = match part {
            ParameterPart::Real => indices.re,
            ParameterPart::Imag => indices.im,
        };
        row.map_or(0.0, |row| self.fit_parameter_cov(row, row).max(0.0).sqrt())
    }

    fn wave_pair(&self, a: &str, b: &str) -> Option<(WaveIndex, WaveIndex)> {
        Some((self.wave_index(a)?, self.wave_index(b)?))
    }

    /// [`FitResult::phase`] addressed by wave name.
    pub fn phase_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.phase(a, b))
    }

    /// [`FitResult::phase_err`] addressed by wave name.
    pub fn phase_err_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.phase_err(a, b))
    }

    /// [`FitResult::coherence`] addressed by wave name.
    pub fn coherence_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.coherence(a, b))
    }

    /// [`FitResult::coherence_err`] addressed by wave name.
    pub fn coherence_err_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.coherence_err(a, b))
    }

    /// [`FitResult::overlap`] addressed by wave name.
    pub fn overlap_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.overlap(a, b))
    }

    /// [`FitResult::overlap_err`] addressed by wave name.
    pub fn overlap_err_by_name(&self, a: &str, b: &str) -> f64 {
        self.wave_pair(a, b).map_or(0.0, |(a, b)| self.overlap_err(a, b))
    }
}
