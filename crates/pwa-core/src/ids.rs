//! Typed indices into the arrays owned by a fit result.
//!
//! The fit result is the only owner of amplitudes, wave names and the
//! parameter covariance matrix; everything else refers to them through these
//! identifiers so that an amplitude slot can never be used as a wave slot or a
//! covariance row by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! typed_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new identifier from its raw position.
            ///
            /// The position is not checked against any container; indexed
            /// accessors panic on identifiers that are out of range.
            pub const fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            /// Returns the raw position of the identifier.
            pub const fn as_raw(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_index!(
    /// Position of a production amplitude within the amplitude sequence.
    AmplitudeIndex
);

typed_index!(
    /// Position of a distinct wave within the wave-name sequence.
    WaveIndex
);

typed_index!(
    /// Row/column of a real fit parameter in the parameter covariance matrix.
    ParameterIndex
);

/// Rank sector of a production amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(u32);

impl Rank {
    /// Creates a rank from its numeric label.
    pub const fn new(rank: u32) -> Self {
        Self(rank)
    }

    /// Returns the numeric label.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Covariance rows of the real and imaginary part of one production amplitude.
///
/// `None` marks a part that is not a free fit parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ParameterIndices {
    /// Row of the real part.
    pub re: Option<ParameterIndex>,
    /// Row of the imaginary part.
    pub im: Option<ParameterIndex>,
}

impl ParameterIndices {
    /// Both parts are free parameters at the given rows.
    pub const fn new(re: ParameterIndex, im: ParameterIndex) -> Self {
        Self {
            re: Some(re),
            im: Some(im),
        }
    }

    /// Amplitude that is fixed in the fit.
    pub const fn fixed() -> Self {
        Self { re: None, im: None }
    }

    /// Converts the signed pair used by fit engines, where a negative value
    /// marks a fixed parameter.
    pub fn from_signed(re: i64, im: i64) -> Self {
        let convert = |raw: i64| usize::try_from(raw).ok().map(ParameterIndex::from_raw);
        Self {
            re: convert(re),
            im: convert(im),
        }
    }

    /// Inverse of [`ParameterIndices::from_signed`].
    pub fn to_signed(&self) -> (i64, i64) {
        let convert = |idx: Option<ParameterIndex>| idx.map_or(-1, |idx| idx.as_raw() as i64);
        (convert(self.re), convert(self.im))
    }

    /// Iterates over the parts that are free parameters.
    pub fn iter(&self) -> impl Iterator<Item = ParameterIndex> {
        self.re.into_iter().chain(self.im)
    }
}
