//! Fit-result container for one kinematic bin.

use nalgebra::DMatrix;
use num_complex::Complex64;
use pwa_core::errors::{ErrorInfo, PwaError};
use pwa_core::{AmplitudeIndex, ParameterIndex, ParameterIndices, Rank, WaveIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::names::AmplitudeName;
use crate::wave_map::{rank_matched_pairs, WaveMap};

fn input_error(code: &str, message: impl Into<String>) -> PwaError {
    PwaError::Input(ErrorInfo::new(code, message))
}

fn default_true() -> bool {
    true
}

/// Bulk-fill document in the representation produced by fit engines.
///
/// Complex numbers are `[re, im]` pairs and covariance rows are signed, with a
/// negative value marking a parameter that was fixed in the fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FitInput {
    /// Production amplitudes as `[re, im]`.
    pub prod_amps: Vec<[f64; 2]>,
    /// Amplitude names, parallel to `prod_amps`.
    pub prod_amp_names: Vec<String>,
    /// Covariance rows of the real and imaginary parts, parallel to `prod_amps`.
    pub fit_par_cov_indices: Vec<(i64, i64)>,
    /// Event count used to normalise yields.
    #[serde(default)]
    pub norm_nmb_events: i64,
    /// Number of events in the bin.
    #[serde(default)]
    pub nmb_events: u64,
    /// Centre of the kinematic bin.
    #[serde(default)]
    pub mass_bin_center: f64,
    /// Log-likelihood at the fit minimum.
    #[serde(default)]
    pub log_likelihood: f64,
    /// Number of rank sectors of the fit model. Inferred from the
    /// production amplitude names when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Normalisation integral, rows of `[re, im]` entries indexed by wave.
    #[serde(default)]
    pub norm_integral: Vec<Vec<[f64; 2]>>,
    /// Covariance matrix of the real fit parameters; empty when unavailable.
    #[serde(default)]
    pub fit_par_cov_matrix: Vec<Vec<f64>>,
    /// Whether the fitter reported the covariance matrix as usable.
    #[serde(default = "default_true")]
    pub fit_par_cov_matrix_valid: bool,
}

fn dense_from_rows<T, U>(
    rows: &[Vec<T>],
    code: &str,
    convert: impl Fn(&T) -> U,
) -> Result<DMatrix<U>, PwaError>
where
    U: nalgebra::Scalar,
{
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(PwaError::Input(
            ErrorInfo::new(code, "ragged matrix rows")
                .with_context("row", row)
                .with_context("expected", ncols)
                .with_context("found", bad.len()),
        ));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| convert(&rows[i][j])))
}

/// Stores the production amplitudes, their covariance and the wave bookkeeping
/// of one kinematic bin.
///
/// The container is filled once per bin; all observables are read-only
/// queries over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FitInput", into = "FitInput")]
pub struct FitResult {
    pub(crate) norm_nmb_events: i64,
    pub(crate) nmb_events: u64,
    pub(crate) mass_bin_center: f64,
    pub(crate) log_likelihood: f64,
    pub(crate) rank: u32,
    pub(crate) prod_amps: Vec<Complex64>,
    pub(crate) prod_amp_names: Vec<String>,
    pub(crate) amp_names: Vec<AmplitudeName>,
    pub(crate) fit_par_cov_indices: Vec<ParameterIndices>,
    pub(crate) has_errors: bool,
    pub(crate) fit_par_cov: DMatrix<f64>,
    pub(crate) norm_integral: DMatrix<Complex64>,
    pub(crate) wave_map: WaveMap,
}

impl Default for FitResult {
    fn default() -> Self {
        Self {
            norm_nmb_events: 0,
            nmb_events: 0,
            mass_bin_center: 0.0,
            log_likelihood: 0.0,
            rank: 0,
            prod_amps: Vec::new(),
            prod_amp_names: Vec::new(),
            amp_names: Vec::new(),
            fit_par_cov_indices: Vec::new(),
            has_errors: false,
            fit_par_cov: DMatrix::zeros(0, 0),
            norm_integral: DMatrix::from_element(0, 0, Complex64::new(0.0, 0.0)),
            wave_map: WaveMap::default(),
        }
    }
}

impl FitResult {
    /// Empty container; equivalent to a freshly reset one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole state from a fit-engine document.
    ///
    /// Either the new state is installed completely or, on error, the current
    /// state is left untouched.
    pub fn fill(&mut self, input: &FitInput) -> Result<(), PwaError> {
        *self = FitResultBuilder::from_input(input)?.build()?;
        Ok(())
    }

    /// Clears every container back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Converts back into the fit-engine representation.
    pub fn to_input(&self) -> FitInput {
        FitInput {
            prod_amps: self.prod_amps.iter().map(|z| [z.re, z.im]).collect(),
            prod_amp_names: self.prod_amp_names.clone(),
            fit_par_cov_indices: self.fit_par_cov_indices.iter().map(|p| p.to_signed()).collect(),
            norm_nmb_events: self.norm_nmb_events,
            nmb_events: self.nmb_events,
            mass_bin_center: self.mass_bin_center,
            log_likelihood: self.log_likelihood,
            rank: Some(self.rank),
            norm_integral: self
                .norm_integral
                .row_iter()
                .map(|row| row.iter().map(|z| [z.re, z.im]).collect())
                .collect(),
            fit_par_cov_matrix: self
                .fit_par_cov
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
            fit_par_cov_matrix_valid: self.has_errors,
        }
    }

    /// Event count used to normalise yields.
    pub fn norm_nmb_events(&self) -> i64 {
        self.norm_nmb_events
    }

    /// Number of events in the bin.
    pub fn nmb_events(&self) -> u64 {
        self.nmb_events
    }

    /// Centre of the kinematic bin.
    pub fn mass_bin_center(&self) -> f64 {
        self.mass_bin_center
    }

    /// Log-likelihood at the fit minimum.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Number of rank sectors.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Whether a usable parameter covariance matrix is present.
    pub fn has_valid_errors(&self) -> bool {
        self.has_errors
    }

    /// Number of production amplitudes.
    pub fn nmb_prod_amps(&self) -> usize {
        self.prod_amps.len()
    }

    /// Number of distinct waves.
    pub fn nmb_waves(&self) -> usize {
        self.wave_map.nmb_waves()
    }

    /// All production amplitudes.
    pub fn prod_amps(&self) -> &[Complex64] {
        &self.prod_amps
    }

    /// Production amplitude at `amp`.
    ///
    /// # Panics
    ///
    /// Panics if `amp` is not below [`Self::nmb_prod_amps`].
    pub fn prod_amp(&self, amp: AmplitudeIndex) -> Complex64 {
        self.prod_amps[amp.as_raw()]
    }

    /// Production amplitude at `amp`, or `None` when out of range.
    pub fn get_prod_amp(&self, amp: AmplitudeIndex) -> Option<Complex64> {
        self.prod_amps.get(amp.as_raw()).copied()
    }

    /// All production amplitude names as supplied.
    pub fn prod_amp_names(&self) -> &[String] {
        &self.prod_amp_names
    }

    /// Name of the amplitude at `amp`.
    ///
    /// # Panics
    ///
    /// Panics if `amp` is not below [`Self::nmb_prod_amps`].
    pub fn prod_amp_name(&self, amp: AmplitudeIndex) -> &str {
        &self.prod_amp_names[amp.as_raw()]
    }

    /// Name of the amplitude at `amp`, or `None` when out of range.
    pub fn get_prod_amp_name(&self, amp: AmplitudeIndex) -> Option<&str> {
        self.prod_amp_names.get(amp.as_raw()).map(String::as_str)
    }

    /// Parsed name of the amplitude at `amp`. Panics like [`Self::prod_amp`].
    pub fn amplitude_name(&self, amp: AmplitudeIndex) -> &AmplitudeName {
        &self.amp_names[amp.as_raw()]
    }

    /// Wave title of the amplitude at `amp` (its name without the rank tag).
    /// Panics like [`Self::prod_amp`].
    pub fn wave_title(&self, amp: AmplitudeIndex) -> &str {
        &self.amp_names[amp.as_raw()].wave
    }

    /// Rank of the amplitude at `amp`; `None` for the flat term.
    /// Panics like [`Self::prod_amp`].
    pub fn rank_of_prod_amp(&self, amp: AmplitudeIndex) -> Option<Rank> {
        self.amp_names[amp.as_raw()].rank
    }

    /// Distinct wave names.
    pub fn wave_names(&self) -> &[String] {
        self.wave_map.wave_names()
    }

    /// Name of the wave at `wave`.
    ///
    /// # Panics
    ///
    /// Panics if `wave` is not below [`Self::nmb_waves`].
    pub fn wave_name(&self, wave: WaveIndex) -> &str {
        &self.wave_map.wave_names()[wave.as_raw()]
    }

    /// Name of the wave at `wave`, or `None` when out of range.
    pub fn get_wave_name(&self, wave: WaveIndex) -> Option<&str> {
        self.wave_map.wave_names().get(wave.as_raw()).map(String::as_str)
    }

    /// Looks up a wave by name, warning when it is not part of this result.
    pub fn wave_index(&self, name: &str) -> Option<WaveIndex> {
        let index = self.wave_map.wave_index(name);
        if index.is_none() {
            warn!(wave = name, "could not find any wave with this name");
        }
        index
    }

    /// Whether `wave` is the flat incoherent term.
    pub fn is_flat_wave(&self, wave: WaveIndex) -> bool {
        self.wave_map
            .amps_of_wave(wave)
            .first()
            .is_some_and(|amp| self.amp_names[amp.as_raw()].is_flat())
    }

    /// Index maps derived from the amplitude names.
    pub fn wave_map(&self) -> &WaveMap {
        &self.wave_map
    }

    /// First amplitude sharing the wave of `amp`.
    pub fn representative_index(&self, amp: AmplitudeIndex) -> Option<AmplitudeIndex> {
        self.wave_map.representative(amp)
    }

    /// Amplitudes of `wave` across all ranks.
    pub fn prod_amp_indices_for_wave(&self, wave: WaveIndex) -> Vec<AmplitudeIndex> {
        self.wave_map.amps_of_wave(wave)
    }

    /// Rank-matched amplitude pairs for waves `a` and `b`.
    pub fn prod_amp_index_pairs_for_waves(
        &self,
        a: WaveIndex,
        b: WaveIndex,
    ) -> Vec<(AmplitudeIndex, AmplitudeIndex)> {
        rank_matched_pairs(
            &self.amp_names,
            &self.wave_map.amps_of_wave(a),
            &self.wave_map.amps_of_wave(b),
        )
    }

    /// Waves whose name contains `pattern`.
    pub fn wave_indices_matching_pattern(&self, pattern: &str) -> Vec<WaveIndex> {
        let waves = self.wave_map.waves_matching(pattern);
        if waves.is_empty() {
            warn!(pattern, "no wave matches pattern");
        }
        waves
    }

    /// Amplitudes whose wave name contains `pattern`.
    pub fn prod_amp_indices_matching_pattern(&self, pattern: &str) -> Vec<AmplitudeIndex> {
        let amps = self.wave_map.amps_matching(pattern);
        if amps.is_empty() {
            warn!(pattern, "no production amplitude matches pattern");
        }
        amps
    }

    /// Covariance rows of the real and imaginary parts of `amp`.
    /// Panics like [`Self::prod_amp`].
    pub fn fit_par_cov_indices(&self, amp: AmplitudeIndex) -> ParameterIndices {
        self.fit_par_cov_indices[amp.as_raw()]
    }

    /// Full parameter covariance matrix.
    pub fn parameter_covariance(&self) -> &DMatrix<f64> {
        &self.fit_par_cov
    }

    /// Covariance of two real fit parameters.
    ///
    /// # Panics
    ///
    /// Panics if either index lies outside [`Self::parameter_covariance`],
    /// which is empty when [`Self::has_valid_errors`] is false.
    pub fn fit_parameter_cov(&self, i: ParameterIndex, j: ParameterIndex) -> f64 {
        self.fit_par_cov[(i.as_raw(), j.as_raw())]
    }

    /// Full normalisation-integral matrix, indexed by wave.
    pub fn norm_integral_matrix(&self) -> &DMatrix<Complex64> {
        &self.norm_integral
    }

    /// Normalisation integral of waves `a` and `b`.
    ///
    /// The flat wave has unit self-overlap and no overlap with other waves.
    pub fn norm_integral(&self, a: WaveIndex, b: WaveIndex) -> Complex64 {
        match (self.is_flat_wave(a), self.is_flat_wave(b)) {
            (true, true) => Complex64::new(1.0, 0.0),
            (true, false) | (false, true) => Complex64::new(0.0, 0.0),
            (false, false) => self.norm_integral_entry(a, b),
        }
    }

    /// Normalisation integral for the waves of amplitudes `a` and `b`,
    /// resolved through their representative amplitudes.
    pub fn norm_integral_for_prod_amp(&self, a: AmplitudeIndex, b: AmplitudeIndex) -> Complex64 {
        let flat_a = self.amp_names[a.as_raw()].is_flat();
        let flat_b = self.amp_names[b.as_raw()].is_flat();
        match (flat_a, flat_b) {
            (true, true) => Complex64::new(1.0, 0.0),
            (true, false) | (false, true) => Complex64::new(0.0, 0.0),
            (false, false) => {
                let wave = |amp| {
                    self.wave_map
                        .representative(amp)
                        .and_then(|rep| self.wave_map.wave_of(rep))
                };
                match (wave(a), wave(b)) {
                    (Some(wave_a), Some(wave_b)) => self.norm_integral_entry(wave_a, wave_b),
                    _ => {
                        warn!(amp_a = %a, amp_b = %b, "amplitude index is out of bound");
                        Complex64::new(0.0, 0.0)
                    }
                }
            }
        }
    }

    fn norm_integral_entry(&self, a: WaveIndex, b: WaveIndex) -> Complex64 {
        let (rows, cols) = self.norm_integral.shape();
        if a.as_raw() >= rows || b.as_raw() >= cols {
            warn!(
                wave_a = %a,
                wave_b = %b,
                rows,
                cols,
                "normalization integral index is out of bound"
            );
            return Complex64::new(0.0, 0.0);
        }
        self.norm_integral[(a.as_raw(), b.as_raw())]
    }
}

impl TryFrom<FitInput> for FitResult {
    type Error = PwaError;

    fn try_from(input: FitInput) -> Result<Self, Self::Error> {
        FitResultBuilder::from_input(&input)?.build()
    }
}

impl From<FitResult> for FitInput {
    fn from(result: FitResult) -> Self {
        result.to_input()
    }
}

/// Accumulates the content of one bin and produces a [`FitResult`].
#[derive(Debug, Clone, Default)]
pub struct FitResultBuilder {
    prod_amps: Vec<Complex64>,
    prod_amp_names: Vec<String>,
    fit_par_cov_indices: Vec<ParameterIndices>,
    norm_nmb_events: i64,
    nmb_events: u64,
    mass_bin_center: f64,
    log_likelihood: f64,
    rank: Option<u32>,
    fit_par_cov: Option<DMatrix<f64>>,
    fit_par_cov_valid: bool,
    norm_integral: Option<DMatrix<Complex64>>,
}

impl FitResultBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self {
            fit_par_cov_valid: true,
            ..Self::default()
        }
    }

    /// Converts a fit-engine document, checking that its matrices are rectangular.
    pub fn from_input(input: &FitInput) -> Result<Self, PwaError> {
        let fit_par_cov = dense_from_rows(&input.fit_par_cov_matrix, "cov-ragged", |v| *v)?;
        let norm_integral =
            dense_from_rows(&input.norm_integral, "norm-ragged", |[re, im]| Complex64::new(*re, *im))?;
        Ok(Self {
            prod_amps: input
                .prod_amps
                .iter()
                .map(|[re, im]| Complex64::new(*re, *im))
                .collect(),
            prod_amp_names: input.prod_amp_names.clone(),
            fit_par_cov_indices: input
                .fit_par_cov_indices
                .iter()
                .map(|(re, im)| ParameterIndices::from_signed(*re, *im))
                .collect(),
            norm_nmb_events: input.norm_nmb_events,
            nmb_events: input.nmb_events,
            mass_bin_center: input.mass_bin_center,
            log_likelihood: input.log_likelihood,
            rank: input.rank,
            fit_par_cov: Some(fit_par_cov),
            fit_par_cov_valid: input.fit_par_cov_matrix_valid,
            norm_integral: Some(norm_integral),
        })
    }

    /// Appends one production amplitude.
    pub fn amplitude(
        mut self,
        name: impl Into<String>,
        value: Complex64,
        indices: ParameterIndices,
    ) -> Self {
        self.prod_amp_names.push(name.into());
        self.prod_amps.push(value);
        self.fit_par_cov_indices.push(indices);
        self
    }

    /// Sets the parameter covariance matrix.
    pub fn covariance(mut self, covariance: DMatrix<f64>) -> Self {
        self.fit_par_cov = Some(covariance);
        self
    }

    /// Marks the covariance matrix as unusable even if present.
    pub fn covariance_valid(mut self, valid: bool) -> Self {
        self.fit_par_cov_valid = valid;
        self
    }

    /// Sets the wave-indexed normalisation integral.
    pub fn norm_integral(mut self, integral: DMatrix<Complex64>) -> Self {
        self.norm_integral = Some(integral);
        self
    }

    /// Sets the normalisation and raw event counts.
    pub fn events(mut self, norm_nmb_events: i64, nmb_events: u64) -> Self {
        self.norm_nmb_events = norm_nmb_events;
        self.nmb_events = nmb_events;
        self
    }

    /// Sets the bin centre.
    pub fn mass_bin_center(mut self, center: f64) -> Self {
        self.mass_bin_center = center;
        self
    }

    /// Sets the log-likelihood.
    pub fn log_likelihood(mut self, value: f64) -> Self {
        self.log_likelihood = value;
        self
    }

    /// Sets the number of rank sectors; defaults to the highest rank tag + 1.
    pub fn rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Validates the accumulated content and builds the wave map.
    pub fn build(self) -> Result<FitResult, PwaError> {
        let nmb_amps = self.prod_amps.len();
        if self.prod_amp_names.len() != nmb_amps || self.fit_par_cov_indices.len() != nmb_amps {
            return Err(PwaError::Input(
                ErrorInfo::new("fill-length-mismatch", "parallel amplitude sequences differ in length")
                    .with_context("amplitudes", nmb_amps)
                    .with_context("names", self.prod_amp_names.len())
                    .with_context("cov_indices", self.fit_par_cov_indices.len()),
            ));
        }

        let amp_names = self
            .prod_amp_names
            .iter()
            .map(|name| AmplitudeName::parse(name))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, name) in amp_names.iter().enumerate() {
            if amp_names[..i].contains(name) {
                return Err(PwaError::Input(
                    ErrorInfo::new("fill-duplicate-name", "amplitude name appears twice")
                        .with_context("name", &self.prod_amp_names[i]),
                ));
            }
        }

        let fit_par_cov = self.fit_par_cov.unwrap_or_else(|| DMatrix::zeros(0, 0));
        let has_cov = fit_par_cov.nrows() > 0 && fit_par_cov.ncols() > 0;
        if has_cov {
            if !fit_par_cov.is_square() {
                return Err(PwaError::Input(
                    ErrorInfo::new("fill-cov-shape", "parameter covariance matrix is not square")
                        .with_context("rows", fit_par_cov.nrows())
                        .with_context("cols", fit_par_cov.ncols()),
                ));
            }
            let dim = fit_par_cov.nrows();
            for (i, indices) in self.fit_par_cov_indices.iter().enumerate() {
                if let Some(bad) = indices.iter().find(|idx| idx.as_raw() >= dim) {
                    return Err(PwaError::Input(
                        ErrorInfo::new("fill-cov-index", "covariance index out of range")
                            .with_context("amplitude", i)
                            .with_context("index", bad)
                            .with_context("dim", dim),
                    ));
                }
            }
        }
        let has_errors = has_cov && self.fit_par_cov_valid;
        if !has_errors {
            debug!(has_cov, valid = self.fit_par_cov_valid, "fit result carries no usable covariance");
        }

        let norm_integral = self
            .norm_integral
            .unwrap_or_else(|| DMatrix::from_element(0, 0, Complex64::new(0.0, 0.0)));
        if !norm_integral.is_square() {
            return Err(input_error("fill-norm-shape", "normalization integral is not square"));
        }

        let rank = self.rank.unwrap_or_else(|| {
            amp_names
                .iter()
                .filter_map(|name| name.rank)
                .map(|rank| rank.get() + 1)
                .max()
                .unwrap_or(0)
        });
        let wave_map = WaveMap::build(&amp_names);

        Ok(FitResult {
            norm_nmb_events: self.norm_nmb_events,
            nmb_events: self.nmb_events,
            mass_bin_center: self.mass_bin_center,
            log_likelihood: self.log_likelihood,
            rank,
            prod_amps: self.prod_amps,
            prod_amp_names: self.prod_amp_names,
            amp_names,
            fit_par_cov_indices: self.fit_par_cov_indices,
            has_errors,
            fit_par_cov,
            norm_integral,
            wave_map,
        })
    }
}
