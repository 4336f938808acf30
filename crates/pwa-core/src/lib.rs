#![deny(missing_docs)]
#![doc = "Core identifiers and error types for the partial-wave-analysis fit-result engine."]

pub mod errors;
pub mod ids;
pub mod provenance;

pub use errors::{ErrorInfo, PwaError};
pub use ids::{AmplitudeIndex, ParameterIndex, ParameterIndices, Rank, WaveIndex};
pub use provenance::{RunProvenance, SchemaVersion};

/// Name of the wave that carries the incoherent flat background term.
pub const FLAT_WAVE: &str = "flat";
