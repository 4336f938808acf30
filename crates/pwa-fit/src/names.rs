//! Amplitude and fit-parameter naming grammar.
//!
//! ```text
//! amplitude-name := "V" rank "_" wave-title   e.g. V0_1-1++0+rho770_01_pi-.amp
//!                 | "V_flat"
//! parameter-name := amplitude-name "_RE" | amplitude-name "_IM"
//!                 | any name containing "flat"  (real part of the flat term)
//! ```
//!
//! Names are parsed once when a fit result is filled and compared
//! structurally afterwards.

use std::fmt;

use pwa_core::errors::{ErrorInfo, PwaError};
use pwa_core::{Rank, FLAT_WAVE};
use serde::{Deserialize, Serialize};

const AMP_PREFIX: char = 'V';
const REAL_TAG: &str = "_RE";
const IMAG_TAG: &str = "_IM";

fn name_error(code: &str, name: &str, message: impl Into<String>) -> PwaError {
    PwaError::Name(ErrorInfo::new(code, message).with_context("name", name))
}

/// Parsed production-amplitude name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmplitudeName {
    /// Wave title shared by the amplitudes of one wave across ranks.
    pub wave: String,
    /// Rank sector; `None` for the flat term.
    pub rank: Option<Rank>,
}

impl AmplitudeName {
    /// Amplitude of `wave` in rank sector `rank`.
    pub fn new(wave: impl Into<String>, rank: Rank) -> Self {
        Self {
            wave: wave.into(),
            rank: Some(rank),
        }
    }

    /// The flat incoherent term.
    pub fn flat() -> Self {
        Self {
            wave: FLAT_WAVE.to_string(),
            rank: None,
        }
    }

    /// Parses `V<rank>_<wave>` or `V_flat`.
    pub fn parse(name: &str) -> Result<Self, PwaError> {
        let rest = name
            .strip_prefix(AMP_PREFIX)
            .ok_or_else(|| name_error("amp-name-prefix", name, "amplitude name must start with 'V'"))?;
        let (rank, wave) = rest.split_once('_').ok_or_else(|| {
            name_error("amp-name-separator", name, "amplitude name lacks '_' after the rank tag")
        })?;
        if wave.is_empty() {
            return Err(name_error("amp-name-wave", name, "empty wave title"));
        }
        if rank.is_empty() {
            if wave == FLAT_WAVE {
                return Ok(Self::flat());
            }
            return Err(name_error(
                "amp-name-rank",
                name,
                "only the flat term may omit the rank tag",
            ));
        }
        let rank = rank
            .parse::<u32>()
            .map_err(|err| name_error("amp-name-rank", name, format!("invalid rank tag: {err}")))?;
        if wave == FLAT_WAVE {
            return Err(name_error("amp-name-flat-rank", name, "the flat term carries no rank"));
        }
        Ok(Self::new(wave, Rank::new(rank)))
    }

    /// Whether this is the flat term.
    pub fn is_flat(&self) -> bool {
        self.rank.is_none()
    }
}

impl fmt::Display for AmplitudeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Some(rank) => write!(f, "{AMP_PREFIX}{rank}_{}", self.wave),
            None => write!(f, "{AMP_PREFIX}_{}", self.wave),
        }
    }
}

/// Which real component of a complex amplitude a fit parameter is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterPart {
    /// Real part.
    Real,
    /// Imaginary part.
    Imag,
}

/// Parsed fit-parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FitParameterName {
    /// Amplitude the parameter belongs to.
    pub amplitude: AmplitudeName,
    /// Component of the amplitude.
    pub part: ParameterPart,
}

impl FitParameterName {
    /// Parses a fit-parameter name.
    ///
    /// Any name mentioning `flat` refers to the real part of the flat term.
    pub fn parse(name: &str) -> Result<Self, PwaError> {
        if name.contains(FLAT_WAVE) {
            return Ok(Self {
                amplitude: AmplitudeName::flat(),
                part: ParameterPart::Real,
            });
        }
        let (stem, part) = if let Some(stem) = name.strip_suffix(REAL_TAG) {
            (stem, ParameterPart::Real)
        } else if let Some(stem) = name.strip_suffix(IMAG_TAG) {
            (stem, ParameterPart::Imag)
        } else {
            return Err(name_error(
                "par-name-part",
                name,
                "parameter name must end in '_RE' or '_IM'",
            ));
        };
        Ok(Self {
            amplitude: AmplitudeName::parse(stem)?,
            part,
        })
    }
}

impl fmt::Display for FitParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.part {
            ParameterPart::Real => REAL_TAG,
            ParameterPart::Imag => IMAG_TAG,
        };
        write!(f, "{}{tag}", self.amplitude)
    }
}
