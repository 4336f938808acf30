//! Bookkeeping between production amplitudes, waves and rank sectors.

use pwa_core::{AmplitudeIndex, Rank, WaveIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::names::AmplitudeName;

/// Index maps derived from the ordered amplitude names of one fit result.
///
/// Waves are numbered in order of first appearance in the amplitude sequence,
/// so rebuilding the map over identical names reproduces it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveMap {
    wave_names: Vec<String>,
    amp_waves: Vec<WaveIndex>,
    representatives: Vec<AmplitudeIndex>,
}

impl WaveMap {
    /// Builds the wave list and the amplitude -> representative map.
    ///
    /// The representative of an amplitude is the first amplitude carrying the
    /// same wave title; normalisation integrals are looked up through it.
    pub fn build(names: &[AmplitudeName]) -> Self {
        let mut wave_names: Vec<String> = Vec::new();
        let mut first_amp: Vec<AmplitudeIndex> = Vec::new();
        let mut amp_waves = Vec::with_capacity(names.len());
        let mut representatives = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let wave = match wave_names.iter().position(|title| *title == name.wave) {
                Some(pos) => WaveIndex::from_raw(pos),
                None => {
                    debug!(wave = %name.wave, index = wave_names.len(), "registering wave");
                    wave_names.push(name.wave.clone());
                    first_amp.push(AmplitudeIndex::from_raw(i));
                    WaveIndex::from_raw(wave_names.len() - 1)
                }
            };
            amp_waves.push(wave);
            representatives.push(first_amp[wave.as_raw()]);
        }
        Self {
            wave_names,
            amp_waves,
            representatives,
        }
    }

    /// Distinct wave titles in order of first appearance.
    pub fn wave_names(&self) -> &[String] {
        &self.wave_names
    }

    /// Number of distinct waves.
    pub fn nmb_waves(&self) -> usize {
        self.wave_names.len()
    }

    /// Wave of the given amplitude.
    pub fn wave_of(&self, amp: AmplitudeIndex) -> Option<WaveIndex> {
        self.amp_waves.get(amp.as_raw()).copied()
    }

    /// First amplitude index sharing the wave title of `amp`.
    pub fn representative(&self, amp: AmplitudeIndex) -> Option<AmplitudeIndex> {
        self.representatives.get(amp.as_raw()).copied()
    }

    /// Full amplitude -> representative map, one entry per amplitude.
    pub fn representatives(&self) -> &[AmplitudeIndex] {
        &self.representatives
    }

    /// Looks up a wave by exact title.
    pub fn wave_index(&self, title: &str) -> Option<WaveIndex> {
        self.wave_names
            .iter()
            .position(|name| name == title)
            .map(WaveIndex::from_raw)
    }

    /// Amplitudes belonging to `wave`, in stored order.
    pub fn amps_of_wave(&self, wave: WaveIndex) -> Vec<AmplitudeIndex> {
        self.amp_waves
            .iter()
            .enumerate()
            .filter(|(_, w)| **w == wave)
            .map(|(i, _)| AmplitudeIndex::from_raw(i))
            .collect()
    }

    /// Waves whose title contains `pattern` as a substring.
    pub fn waves_matching(&self, pattern: &str) -> Vec<WaveIndex> {
        self.wave_names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.contains(pattern))
            .map(|(i, _)| WaveIndex::from_raw(i))
            .collect()
    }

    /// Amplitudes whose wave title contains `pattern` as a substring.
    pub fn amps_matching(&self, pattern: &str) -> Vec<AmplitudeIndex> {
        self.amp_waves
            .iter()
            .enumerate()
            .filter(|(_, wave)| self.wave_names[wave.as_raw()].contains(pattern))
            .map(|(i, _)| AmplitudeIndex::from_raw(i))
            .collect()
    }
}

/// Rank-matched amplitude pairs `(a, b)` with `a` from `amps_a` and `b` from
/// `amps_b`, ordered by `a` then `b`. Amplitudes without a partner of the same
/// rank produce no pair.
pub fn rank_matched_pairs(
    names: &[AmplitudeName],
    amps_a: &[AmplitudeIndex],
    amps_b: &[AmplitudeIndex],
) -> Vec<(AmplitudeIndex, AmplitudeIndex)> {
    let rank = |amp: &AmplitudeIndex| -> Option<Rank> { names[amp.as_raw()].rank };
    let mut pairs = Vec::new();
    for a in amps_a {
        for b in amps_b {
            if rank(a) == rank(b) {
                pairs.push((*a, *b));
            }
        }
    }
    pairs
}
