#![allow(dead_code)]

use nalgebra::DMatrix;
use num_complex::Complex64;
use pwa_core::{ParameterIndex, ParameterIndices};
use pwa_fit::{FitResult, FitResultBuilder};

pub const WAVE_A: &str = "1-1++0+rho770_01_pi-.amp";
pub const WAVE_B: &str = "1-2-+0+f2_02_pi-.amp";

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Free-parameter layout used by fit engines: two consecutive rows per
/// amplitude, one row for the flat term.
pub fn parameter_layout(names: &[&str]) -> (Vec<ParameterIndices>, usize) {
    let mut next = 0;
    let mut layout = Vec::new();
    for name in names {
        if name.contains("flat") {
            layout.push(ParameterIndices {
                re: Some(ParameterIndex::from_raw(next)),
                im: None,
            });
            next += 1;
        } else {
            layout.push(ParameterIndices::new(
                ParameterIndex::from_raw(next),
                ParameterIndex::from_raw(next + 1),
            ));
            next += 2;
        }
    }
    (layout, next)
}

/// Builds a fit result; `cov` of `None` means unit covariance.
pub fn synthetic(
    amps: &[(&str, Complex64)],
    norm: DMatrix<Complex64>,
    cov: Option<DMatrix<f64>>,
) -> FitResult {
    let names: Vec<&str> = amps.iter().map(|(name, _)| *name).collect();
    let (layout, dim) = parameter_layout(&names);
    let mut builder = FitResultBuilder::new()
        .events(1000, 1250)
        .mass_bin_center(1.42)
        .log_likelihood(-12345.6)
        .norm_integral(norm)
        .covariance(cov.unwrap_or_else(|| DMatrix::identity(dim, dim)));
    for ((name, value), indices) in amps.iter().zip(layout) {
        builder = builder.amplitude(*name, *value, indices);
    }
    builder.build().expect("synthetic fit result")
}

/// Two single-rank waves with `V_A = 1`, `V_B = i`.
pub fn two_wave(norm_ab: Complex64) -> FitResult {
    let norm = DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), norm_ab, norm_ab.conj(), c(1.0, 0.0)]);
    let name_a = format!("V0_{WAVE_A}");
    let name_b = format!("V0_{WAVE_B}");
    synthetic(
        &[(name_a.as_str(), c(1.0, 0.0)), (name_b.as_str(), c(0.0, 1.0))],
        norm,
        None,
    )
}

/// Two waves over two ranks (wave B only at rank 0) plus the flat term.
pub fn two_rank_amps() -> Vec<(String, Complex64)> {
    vec![
        (format!("V0_{WAVE_A}"), c(1.2, -0.4)),
        (format!("V0_{WAVE_B}"), c(0.3, 0.8)),
        (format!("V1_{WAVE_A}"), c(-0.5, 0.6)),
        ("V_flat".to_string(), c(0.7, 0.0)),
    ]
}

/// Hermitian wave-indexed integral with unit diagonal for `[A, B, flat]`.
pub fn two_rank_norm() -> DMatrix<Complex64> {
    let ab = c(0.25, -0.1);
    DMatrix::from_row_slice(
        3,
        3,
        &[
            c(1.0, 0.0),
            ab,
            c(0.0, 0.0),
            ab.conj(),
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            c(1.0, 0.0),
        ],
    )
}

pub fn two_rank(amps: &[(String, Complex64)], cov: Option<DMatrix<f64>>) -> FitResult {
    let borrowed: Vec<(&str, Complex64)> = amps.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    synthetic(&borrowed, two_rank_norm(), cov)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol * (1.0 + expected.abs()),
        "expected {expected}, got {actual}"
    );
}
