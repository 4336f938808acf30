//! Particle properties and the lookup table amplitude models read them from.

use std::collections::BTreeMap;
use std::fmt;

use pwa_core::errors::{ErrorInfo, PwaError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Static properties of one particle species.
///
/// Isospin and spin are stored in units of ħ/2; parities are `+1`, `-1` or 0
/// where undefined.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleProperties {
    /// Name without charge suffix, e.g. `pi`.
    pub name: String,
    /// Mass in GeV/c².
    #[serde(default)]
    pub mass: f64,
    /// Total width in GeV/c².
    #[serde(default)]
    pub width: f64,
    /// Baryon number.
    #[serde(default)]
    pub baryon_nmb: i32,
    /// Isospin (ħ/2 units).
    #[serde(default)]
    pub isospin: i32,
    /// Strangeness.
    #[serde(default)]
    pub strangeness: i32,
    /// Charm.
    #[serde(default)]
    pub charm: i32,
    /// Beauty.
    #[serde(default)]
    pub beauty: i32,
    /// G-parity.
    #[serde(default)]
    pub g_parity: i32,
    /// Spin (ħ/2 units).
    #[serde(default)]
    pub spin: i32,
    /// Intrinsic parity.
    #[serde(default)]
    pub parity: i32,
    /// C-parity.
    #[serde(default)]
    pub c_parity: i32,
}

impl ParticleProperties {
    /// Replaces all properties with the table entry `name`.
    pub fn fill_from_table(&mut self, table: &ParticleDataTable, name: &str) -> Result<(), PwaError> {
        match table.entry(name) {
            Some(entry) => {
                *self = entry.clone();
                Ok(())
            }
            None => {
                warn!(particle = name, "cannot fill particle properties from non-existing table entry");
                Err(PwaError::Index(
                    ErrorInfo::new("unknown-particle", "particle is not in the data table")
                        .with_context("name", name),
                ))
            }
        }
    }
}

fn sign_char(value: i32) -> char {
    match value.signum() {
        1 => '+',
        -1 => '-',
        _ => '0',
    }
}

impl fmt::Display for ParticleProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "particle '{}': mass = {}, width = {}, baryon # = {}, IG(JPC) = {}{}({}{}{}), S = {}, Charm = {}, B = {}",
            self.name,
            self.mass,
            self.width,
            self.baryon_nmb,
            self.isospin,
            sign_char(self.g_parity),
            self.spin,
            sign_char(self.parity),
            sign_char(self.c_parity),
            self.strangeness,
            self.charm,
            self.beauty,
        )
    }
}

/// Particle properties keyed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleDataTable {
    entries: BTreeMap<String, ParticleProperties>,
}

impl ParticleDataTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping of particle name to properties.
    ///
    /// Map keys must agree with the `name` field of their entry.
    pub fn from_yaml_str(text: &str) -> Result<Self, PwaError> {
        let table: Self = serde_yaml::from_str(text).map_err(|err| {
            PwaError::Serde(ErrorInfo::new("particle-table-yaml", err.to_string()))
        })?;
        if let Some((key, entry)) = table.entries.iter().find(|(key, entry)| **key != entry.name) {
            return Err(PwaError::Input(
                ErrorInfo::new("particle-table-key", "table key differs from particle name")
                    .with_context("key", key)
                    .with_context("name", &entry.name),
            ));
        }
        debug!(entries = table.entries.len(), "loaded particle data table");
        Ok(table)
    }

    /// Inserts `properties`; an existing entry of the same name is kept and
    /// `false` returned.
    pub fn add_entry(&mut self, properties: ParticleProperties) -> bool {
        if self.entries.contains_key(&properties.name) {
            warn!(particle = %properties.name, "particle is already in the data table, entry not replaced");
            return false;
        }
        self.entries.insert(properties.name.clone(), properties);
        true
    }

    /// Entry for `name`, if present.
    pub fn entry(&self, name: &str) -> Option<&ParticleProperties> {
        self.entries.get(name)
    }

    /// Whether `name` has an entry.
    pub fn is_in_table(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticleProperties> {
        self.entries.values()
    }
}

/// Splits a charged particle name such as `pi-`, `pi0` or `pi2+` into its stem
/// and charge.
///
/// A trailing `+` or `-` sets the sign and a digit from 2 to 9 in front of it
/// is the charge magnitude. A trailing `0` is stripped alone. Names without a
/// charge suffix have charge 0.
pub fn charge_from_name(name: &str) -> (String, i32) {
    let mut chars = name.chars();
    let sign = match chars.next_back() {
        Some('+') => 1,
        Some('-') => -1,
        Some('0') => return (chars.as_str().to_string(), 0),
        _ => return (name.to_string(), 0),
    };
    let stem = chars.as_str();
    let mut stem_chars = stem.chars();
    match stem_chars.next_back().and_then(|c| c.to_digit(10)) {
        Some(magnitude @ 2..=9) => (stem_chars.as_str().to_string(), sign * magnitude as i32),
        _ => (stem.to_string(), sign),
    }
}
