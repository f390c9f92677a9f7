//! Criterion benchmarks for sismo-core filtering
//!
//! Run with: cargo bench -p sismo-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sismo_core::{Band, ZeroPhaseFilter, bandpass, design, detrend_mean, to_pcm16};

const SAMPLE_RATE: f64 = 100.0;
const TRACE_LENGTHS: &[usize] = &[1_000, 10_000, 100_000];

fn generate_test_signal(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (std::f64::consts::TAU * 1.5 * t).sin() + 0.3 * (std::f64::consts::TAU * 20.0 * t).sin()
        })
        .collect()
}

fn bench_design(c: &mut Criterion) {
    let mut group = c.benchmark_group("Design");
    for order in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("bandpass", order), &order, |b, &order| {
            b.iter(|| {
                black_box(design(
                    Band::Bandpass { low_hz: 1.0, high_hz: 10.0 },
                    order,
                    SAMPLE_RATE,
                ))
            });
        });
    }
    group.finish();
}

fn bench_filtfilt(c: &mut Criterion) {
    let mut group = c.benchmark_group("ZeroPhaseFilter");
    let filter =
        ZeroPhaseFilter::new(Band::Bandpass { low_hz: 1.0, high_hz: 10.0 }, 4, SAMPLE_RATE)
            .unwrap();

    for &len in TRACE_LENGTHS {
        let input = generate_test_signal(len);
        group.bench_with_input(BenchmarkId::new("apply", len), &len, |b, _| {
            b.iter(|| black_box(filter.apply(black_box(&input))));
        });
        group.bench_with_input(BenchmarkId::new("design_and_apply", len), &len, |b, _| {
            b.iter(|| black_box(bandpass(black_box(&input), 1.0, 10.0, SAMPLE_RATE)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render");
    for &len in TRACE_LENGTHS {
        let input = generate_test_signal(len);
        group.bench_with_input(BenchmarkId::new("detrend_mean", len), &len, |b, _| {
            b.iter(|| black_box(detrend_mean(black_box(&input))));
        });
        group.bench_with_input(BenchmarkId::new("to_pcm16", len), &len, |b, _| {
            b.iter(|| black_box(to_pcm16(black_box(&input), SAMPLE_RATE, 4)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_design, bench_filtfilt, bench_render);
criterion_main!(benches);
