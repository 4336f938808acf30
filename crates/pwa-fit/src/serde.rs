//! Canonical JSON encoding for fit documents and per-bin reports.
//!
//! Object keys are emitted in sorted order and negative zero is written as
//! zero, so equal values always produce equal bytes and equal hashes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ::serde::{Deserialize, Serialize};
use pwa_core::errors::{ErrorInfo, PwaError};
use serde_json::{Map, Number, Value};

fn serde_error(code: &str, err: impl ToString) -> PwaError {
    PwaError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonical_number(number: Number) -> Number {
    match number.as_f64() {
        Some(x) if x == 0.0 && x.is_sign_negative() => Number::from_f64(0.0).unwrap_or(number),
        _ => number,
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> =
                map.into_iter().map(|(key, val)| (key, canonicalize(val))).collect();
            Value::Object(ordered.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, PwaError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonicalize(value))
        .map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}

/// Restores a value from JSON bytes.
///
/// A [`crate::FitResult`] decoded this way passes through the same validation
/// as [`crate::FitResult::fill`]. Syntax errors carry the line and column.
pub fn from_json_slice<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, PwaError> {
    serde_json::from_slice(data).map_err(|err| {
        let (line, column) = (err.line(), err.column());
        PwaError::Serde(
            ErrorInfo::new("json-read", err.to_string())
                .with_context("line", line)
                .with_context("column", column),
        )
    })
}

/// Reads and decodes a JSON document from disk.
pub fn from_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, PwaError> {
    let bytes = fs::read(path).map_err(|err| {
        PwaError::Input(
            ErrorInfo::new("json-open", err.to_string()).with_context("path", path.display()),
        )
    })?;
    from_json_slice(&bytes)
}
