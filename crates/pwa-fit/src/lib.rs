#![deny(missing_docs)]
#![doc = "Fit-result container for one kinematic bin of a partial-wave analysis and first-order \
propagation of the fit covariance to spin-density matrix elements, intensities, phases, \
coherences and overlaps."]

/// Covariance of amplitudes and spin-density matrix elements.
pub mod covariance;
/// Canonical hashing helpers for reports.
pub mod hash;
/// Dense-matrix helpers for Jacobian construction.
pub mod linalg;
/// Amplitude and fit-parameter naming grammar.
pub mod names;
/// Observables and their propagated errors.
pub mod observables;
/// Per-bin observable report.
pub mod report;
/// Fit-result container, fill document and builder.
pub mod result;
/// Canonical JSON helpers.
#[path = "serde.rs"]
pub mod serde_io;
/// Amplitude, wave and rank bookkeeping.
pub mod wave_map;

pub use hash::{round_f64, stable_hash_string};
pub use names::{AmplitudeName, FitParameterName, ParameterPart};
pub use report::{analyze_bin, BinReport, Measurement, PatternEntry, ReportOpts, WaveEntry};
pub use result::{FitInput, FitResult, FitResultBuilder};
pub use serde_io::{from_json_file, from_json_slice, to_canonical_json_bytes};
pub use wave_map::WaveMap;
