mod common;

use std::collections::BTreeMap;

use common::{two_rank, two_rank_amps};
use pwa_core::errors::PwaError;
use pwa_fit::{
    from_json_file, from_json_slice, round_f64, stable_hash_string, to_canonical_json_bytes,
    FitResult,
};

#[test]
fn keys_are_sorted_at_every_depth() {
    let mut inner = BTreeMap::new();
    inner.insert("zeta", 1);
    inner.insert("alpha", 2);
    let value = serde_json::json!({ "b": [{ "y": 1, "x": 2 }], "a": inner });
    let bytes = to_canonical_json_bytes(&value).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"a":{"alpha":2,"zeta":1},"b":[{"x":2,"y":1}]}"#
    );
}

#[test]
fn negative_zero_encodes_like_zero() {
    let positive = to_canonical_json_bytes(&vec![0.0_f64, 1.5]).unwrap();
    let negative = to_canonical_json_bytes(&vec![-0.0_f64, 1.5]).unwrap();
    assert_eq!(positive, negative);
    assert_eq!(stable_hash_string(&[-0.0_f64]).unwrap(), stable_hash_string(&[0.0_f64]).unwrap());
}

#[test]
fn rounding_snaps_to_the_report_grid() {
    assert_eq!(round_f64(0.123_456_789_4), 0.123_456_789);
    assert_eq!(round_f64(2.5e-10), 0.0);
    assert!(round_f64(-2.5e-10).is_sign_positive());
    assert!(round_f64(f64::NAN).is_nan());
    assert_eq!(round_f64(f64::INFINITY), f64::INFINITY);
}

#[test]
fn syntax_errors_report_their_position() {
    let err = from_json_slice::<FitResult>(b"{\n  \"prod_amps\": [[1.0, x]]\n}").unwrap_err();
    assert!(matches!(err, PwaError::Serde(_)));
    let info = err.info();
    assert_eq!(info.code, "json-read");
    assert_eq!(info.context.get("line").map(String::as_str), Some("2"));
    assert!(info.context.contains_key("column"));
}

#[test]
fn fit_documents_load_from_disk() {
    let result = two_rank(&two_rank_amps(), None);
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), to_canonical_json_bytes(&result).unwrap()).unwrap();
    let loaded: FitResult = from_json_file(file.path()).unwrap();
    assert_eq!(loaded, result);
}

#[test]
fn missing_files_are_input_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = from_json_file::<FitResult>(&path).unwrap_err();
    assert!(matches!(err, PwaError::Input(_)));
    assert_eq!(err.info().code, "json-open");
    assert_eq!(err.info().context.get("path"), Some(&path.display().to_string()));
}
