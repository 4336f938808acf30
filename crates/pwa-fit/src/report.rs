//! Per-bin summary of all observables with their propagated errors.

use std::collections::BTreeMap;

use pwa_core::errors::{ErrorInfo, PwaError};
use pwa_core::{RunProvenance, SchemaVersion, WaveIndex};
use serde::{Deserialize, Serialize};

use crate::hash::{round_f64, stable_hash_string};
use crate::result::FitResult;

fn default_include_flat() -> bool {
    true
}

/// Options controlling which observables end up in a [`BinReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOpts {
    /// Wave that phases, coherences and overlaps are quoted against. Defaults
    /// to the first wave that is not the flat term.
    #[serde(default)]
    pub reference_wave: Option<String>,
    /// Name patterns whose summed intensity is reported.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Whether the flat wave gets its own entry.
    #[serde(default = "default_include_flat")]
    pub include_flat: bool,
}

impl Default for ReportOpts {
    fn default() -> Self {
        Self {
            reference_wave: None,
            patterns: Vec::new(),
            include_flat: default_include_flat(),
        }
    }
}

/// A value with its one-sigma error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Central value.
    pub value: f64,
    /// Propagated standard error.
    pub error: f64,
}

impl Measurement {
    fn rounded(value: f64, error: f64) -> Self {
        Self {
            value: round_f64(value),
            error: round_f64(error),
        }
    }
}

/// Observables of one wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Wave name.
    pub wave: String,
    /// Intensity `ρ_AA`.
    pub intensity: Measurement,
    /// Phase relative to the reference wave, in degrees.
    pub phase: Option<Measurement>,
    /// Coherence with the reference wave.
    pub coherence: Option<Measurement>,
    /// Overlap with the reference wave.
    pub overlap: Option<Measurement>,
}

/// Summed intensity of the waves matching one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Substring pattern.
    pub pattern: String,
    /// Number of waves that matched.
    pub nmb_waves: usize,
    /// Coherent sum of the matching waves.
    pub intensity: Measurement,
}

/// Structured report for one kinematic bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReport {
    /// Schema version of the report payload.
    pub schema_version: SchemaVersion,
    /// Centre of the kinematic bin.
    pub mass_bin_center: f64,
    /// Number of events in the bin.
    pub nmb_events: u64,
    /// Event count used to normalise yields.
    pub norm_nmb_events: i64,
    /// Log-likelihood at the fit minimum.
    pub log_likelihood: f64,
    /// Number of rank sectors.
    pub rank: u32,
    /// Whether errors were propagated from a valid covariance matrix.
    pub has_valid_errors: bool,
    /// Reference wave used for the relative observables.
    pub reference_wave: Option<String>,
    /// Per-wave observables in wave order.
    pub waves: Vec<WaveEntry>,
    /// Summed intensities in configuration order.
    pub patterns: Vec<PatternEntry>,
    /// Hashes of the inputs and tool versions.
    pub provenance: RunProvenance,
    /// Canonical hash of the report with this field empty.
    pub report_hash: String,
}

fn resolve_reference(result: &FitResult, opts: &ReportOpts) -> Result<Option<WaveIndex>, PwaError> {
    match &opts.reference_wave {
        Some(name) => result.wave_map().wave_index(name).map(Some).ok_or_else(|| {
            PwaError::Config(
                ErrorInfo::new("unknown-reference-wave", "reference wave is not part of the fit result")
                    .with_context("wave", name)
                    .with_hint("use one of the names listed in wave_names"),
            )
        }),
        None => Ok((0..result.nmb_waves())
            .map(WaveIndex::from_raw)
            .find(|wave| !result.is_flat_wave(*wave))),
    }
}

/// Evaluates every configured observable of `result`.
pub fn analyze_bin(result: &FitResult, opts: &ReportOpts) -> Result<BinReport, PwaError> {
    let reference = resolve_reference(result, opts)?;

    let mut waves = Vec::new();
    for wave in (0..result.nmb_waves()).map(WaveIndex::from_raw) {
        if !opts.include_flat && result.is_flat_wave(wave) {
            continue;
        }
        let relative = |value: f64, error: f64| {
            reference
                .filter(|reference| *reference != wave)
                .map(|_| Measurement::rounded(value, error))
        };
        let (phase, coherence, overlap) = match reference {
            Some(r) => (
                relative(result.phase(wave, r), result.phase_err(wave, r)),
                relative(result.coherence(wave, r), result.coherence_err(wave, r)),
                relative(result.overlap(wave, r), result.overlap_err(wave, r)),
            ),
            None => (None, None, None),
        };
        waves.push(WaveEntry {
            wave: result.wave_name(wave).to_string(),
            intensity: Measurement::rounded(result.wave_intensity(wave), result.wave_intensity_err(wave)),
            phase,
            coherence,
            overlap,
        });
    }

    let patterns = opts
        .patterns
        .iter()
        .map(|pattern| PatternEntry {
            pattern: pattern.clone(),
            nmb_waves: result.wave_map().waves_matching(pattern).len(),
            intensity: Measurement::rounded(result.intensity(pattern), result.intensity_err(pattern)),
        })
        .collect();

    let provenance = RunProvenance {
        input_hash: stable_hash_string(result)?,
        options_hash: stable_hash_string(opts)?,
        tool_versions: BTreeMap::from([("pwa-fit".to_string(), env!("CARGO_PKG_VERSION").to_string())]),
    };

    let mut report = BinReport {
        schema_version: SchemaVersion::new(1, 0, 0),
        mass_bin_center: result.mass_bin_center(),
        nmb_events: result.nmb_events(),
        norm_nmb_events: result.norm_nmb_events(),
        log_likelihood: result.log_likelihood(),
        rank: result.rank(),
        has_valid_errors: result.has_valid_errors(),
        reference_wave: reference.map(|wave| result.wave_name(wave).to_string()),
        waves,
        patterns,
        provenance,
        report_hash: String::new(),
    };
    report.report_hash = stable_hash_string(&report)?;
    Ok(report)
}
