use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};

const WAVE_A: &str = "1-1++0+rho770_01_pi-.amp";
const WAVE_B: &str = "1-2-+0+f2_02_pi-.amp";

fn write_fit(dir: &Path) -> std::path::PathBuf {
    let doc = json!({
        "prod_amps": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.0]],
        "prod_amp_names": [format!("V0_{WAVE_A}"), format!("V0_{WAVE_B}"), "V_flat"],
        "fit_par_cov_indices": [[0, 1], [2, 3], [4, -1]],
        "norm_nmb_events": 1000,
        "nmb_events": 1250,
        "mass_bin_center": 1.42,
        "log_likelihood": -100.5,
        "rank": 1,
        "norm_integral": [
            [[1.0, 0.0], [0.5, 0.0], [0.0, 0.0]],
            [[0.5, 0.0], [1.0, 0.0], [0.0, 0.0]],
            [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0]]
        ],
        "fit_par_cov_matrix": [
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.25]
        ]
    });
    let path = dir.join("fit.json");
    fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
    path
}

fn pwa(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pwa"))
        .args(args)
        .output()
        .expect("run pwa")
}

fn query(fit: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--log-level", "error", "query", "--in", fit.to_str().unwrap()];
    full.extend_from_slice(args);
    let output = pwa(&full);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("json answer")
}

#[test]
fn report_writes_hashed_json() {
    let dir = tempfile::tempdir().unwrap();
    let fit = write_fit(dir.path());
    let config = dir.path().join("opts.yaml");
    fs::write(&config, format!("reference_wave: \"{WAVE_B}\"\npatterns: [\"\", \"rho770\"]\n")).unwrap();
    let out = dir.path().join("out");

    let output = pwa(&[
        "report",
        "--in",
        fit.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let printed = String::from_utf8(output.stdout).unwrap();

    let report: Value = serde_json::from_slice(&fs::read(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["report_hash"].as_str(), Some(printed.trim()));
    assert_eq!(report["reference_wave"].as_str(), Some(WAVE_B));
    assert_eq!(report["waves"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["patterns"][0]["intensity"]["value"].as_f64(), Some(2.25));
    assert_eq!(report["has_valid_errors"].as_bool(), Some(true));
}

#[test]
fn query_prints_value_and_error() {
    let dir = tempfile::tempdir().unwrap();
    let fit = write_fit(dir.path());

    let phase = query(&fit, &["phase", WAVE_A, WAVE_B]);
    assert!((phase["value"].as_f64().unwrap() + 90.0).abs() < 1e-9);
    assert_eq!(phase["observable"].as_str(), Some("phase"));

    let overlap = query(&fit, &["overlap", WAVE_A, WAVE_B]);
    assert_eq!(overlap["value"].as_f64(), Some(0.0));
    let err = overlap["error"].as_f64().unwrap();
    assert!((err - 2f64.sqrt()).abs() < 1e-12);

    let parameter = query(&fit, &["parameter", "V_flat"]);
    assert_eq!(parameter["value"].as_f64(), Some(0.5));
    assert_eq!(parameter["error"].as_f64(), Some(0.5));

    let intensity = query(&fit, &["intensity", "rho770"]);
    assert_eq!(intensity["value"].as_f64(), Some(1.0));
    assert_eq!(intensity["error"].as_f64(), Some(2.0));
}

#[test]
fn query_requires_second_wave_for_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let fit = write_fit(dir.path());
    let output = pwa(&["query", "--in", fit.to_str().unwrap(), "coherence", WAVE_A]);
    assert!(!output.status.success());
}

#[test]
fn malformed_fit_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fit = dir.path().join("fit.json");
    fs::write(&fit, r#"{"prod_amps": [[1.0, 0.0]], "prod_amp_names": [], "fit_par_cov_indices": []}"#).unwrap();
    let output = pwa(&["query", "--in", fit.to_str().unwrap(), "intensity", ""]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("fill-length-mismatch"));
}

#[test]
fn version_prints_package_version() {
    let output = pwa(&["version"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), env!("CARGO_PKG_VERSION"));
}
