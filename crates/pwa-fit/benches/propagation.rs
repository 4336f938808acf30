use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use num_complex::Complex64;
use pwa_core::{ParameterIndex, ParameterIndices, WaveIndex};
use pwa_fit::{analyze_bin, FitResult, FitResultBuilder, ReportOpts};

const NMB_WAVES: usize = 40;
const RANK: usize = 2;

fn make_result() -> FitResult {
    let nmb_pars = 2 * NMB_WAVES * RANK;
    let covariance = DMatrix::from_fn(nmb_pars, nmb_pars, |i, j| {
        if i == j {
            1.0
        } else {
            0.01 / (1.0 + (i as f64 - j as f64).abs())
        }
    });
    let integral = DMatrix::from_fn(NMB_WAVES, NMB_WAVES, |i, j| {
        if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            let sign = if i < j { 1.0 } else { -1.0 };
            Complex64::new(0.05, sign * 0.02)
        }
    });
    let mut builder = FitResultBuilder::new()
        .events(10_000, 12_345)
        .mass_bin_center(1.62)
        .covariance(covariance)
        .norm_integral(integral);
    let mut next = 0;
    for rank in 0..RANK {
        for wave in 0..NMB_WAVES {
            let phase = 0.3 * (wave + 7 * rank) as f64;
            builder = builder.amplitude(
                format!("V{rank}_1-{wave}++0+rho770_{wave:02}_pi-.amp"),
                Complex64::from_polar(1.0 + 0.1 * wave as f64, phase),
                ParameterIndices::new(ParameterIndex::from_raw(next), ParameterIndex::from_raw(next + 1)),
            );
            next += 2;
        }
    }
    builder.build().expect("bench fit result")
}

fn bench_propagation(c: &mut Criterion) {
    let result = make_result();
    let (a, b) = (WaveIndex::from_raw(3), WaveIndex::from_raw(17));
    c.bench_function("intensity_err_all_waves", |bench| {
        bench.iter(|| black_box(result.intensity_err(black_box(""))));
    });
    c.bench_function("coherence_err_pair", |bench| {
        bench.iter(|| black_box(result.coherence_err(black_box(a), black_box(b))));
    });
    c.bench_function("analyze_bin", |bench| {
        let opts = ReportOpts::default();
        bench.iter(|| analyze_bin(&result, &opts).expect("report"));
    });
}

criterion_group!(benches, bench_propagation);
criterion_main!(benches);
