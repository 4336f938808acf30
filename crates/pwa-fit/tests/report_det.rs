mod common;

use common::{assert_close, two_rank, two_rank_amps, WAVE_A, WAVE_B};
use pwa_core::errors::PwaError;
use pwa_fit::{analyze_bin, stable_hash_string, ReportOpts};

fn opts() -> ReportOpts {
    ReportOpts {
        reference_wave: None,
        patterns: vec!["".to_string(), "rho770".to_string()],
        include_flat: true,
    }
}

#[test]
fn report_is_reproducible() {
    let result = two_rank(&two_rank_amps(), None);
    let first = analyze_bin(&result, &opts()).unwrap();
    let second = analyze_bin(&result, &opts()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.report_hash.len(), 64);

    let mut unhashed = first.clone();
    unhashed.report_hash.clear();
    assert_eq!(stable_hash_string(&unhashed).unwrap(), first.report_hash);
    assert_eq!(first.provenance.input_hash, stable_hash_string(&result).unwrap());
}

#[test]
fn report_quotes_relative_observables_against_first_wave() {
    let result = two_rank(&two_rank_amps(), None);
    let report = analyze_bin(&result, &opts()).unwrap();
    assert_eq!(report.reference_wave.as_deref(), Some(WAVE_A));
    assert_eq!(report.rank, 2);
    assert!(report.has_valid_errors);
    assert_eq!(report.waves.len(), 3);

    let reference = &report.waves[0];
    assert!(reference.phase.is_none() && reference.coherence.is_none());
    assert_close(reference.intensity.value, 2.21, 1e-9);

    let other = &report.waves[1];
    assert_eq!(other.wave, WAVE_B);
    let phase = other.phase.unwrap();
    assert_close(phase.value, result.phase_by_name(WAVE_B, WAVE_A), 1e-8);
    assert!(phase.error > 0.0);

    let flat = &report.waves[2];
    assert_eq!(flat.coherence.unwrap().value, 0.0);
    assert_eq!(flat.overlap.unwrap().error, 0.0);

    assert_eq!(report.patterns[0].nmb_waves, 3);
    assert_eq!(report.patterns[1].nmb_waves, 1);
    assert_close(report.patterns[0].intensity.value, result.intensity(""), 1e-8);
}

#[test]
fn report_options_select_reference_and_flat() {
    let result = two_rank(&two_rank_amps(), None);
    let options = ReportOpts {
        reference_wave: Some(WAVE_B.to_string()),
        patterns: Vec::new(),
        include_flat: false,
    };
    let report = analyze_bin(&result, &options).unwrap();
    assert_eq!(report.waves.len(), 2);
    assert!(report.waves[1].phase.is_none());
    assert!(report.waves[0].overlap.is_some());
    assert_ne!(report.provenance.options_hash, analyze_bin(&result, &opts()).unwrap().provenance.options_hash);
}

#[test]
fn unknown_reference_wave_is_a_config_error() {
    let result = two_rank(&two_rank_amps(), None);
    let options = ReportOpts {
        reference_wave: Some("1-0-+0+pi_00_pi-.amp".to_string()),
        ..ReportOpts::default()
    };
    match analyze_bin(&result, &options) {
        Err(PwaError::Config(info)) => assert_eq!(info.code, "unknown-reference-wave"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn options_deserialize_with_defaults() {
    let options: ReportOpts = serde_json::from_str(r#"{"patterns": ["f2"]}"#).unwrap();
    assert!(options.include_flat);
    assert!(options.reference_wave.is_none());
    assert_eq!(options.patterns, vec!["f2".to_string()]);
}
