use pwa_core::errors::PwaError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde_io::to_canonical_json_bytes;

/// Reported values and errors are rounded to multiples of `1 / REPORT_SCALE`.
pub const REPORT_SCALE: f64 = 1e9;

/// Hex-encoded SHA-256 of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, PwaError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(format!("{:x}", digest))
}

/// Rounds `value` to a multiple of `1 / REPORT_SCALE`.
///
/// Values that round to zero come back as positive zero; non-finite values
/// pass through unchanged.
pub fn round_f64(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = (value * REPORT_SCALE).round() / REPORT_SCALE;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
