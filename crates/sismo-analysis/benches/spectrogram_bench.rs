//! Criterion benchmarks for sismo-analysis
//!
//! Run with: cargo bench -p sismo-analysis
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sismo_analysis::{Fft, SpectrogramConfig, StftAnalyzer, Window};

const SAMPLE_RATE: f64 = 100.0;

fn generate_sine(size: usize, frequency: f64) -> Vec<f64> {
    (0..size)
        .map(|i| (std::f64::consts::TAU * frequency * i as f64 / SAMPLE_RATE).sin())
        .collect()
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT");
    for size in [256, 1024, 4096] {
        let fft = Fft::new(size);
        let input = generate_sine(size, 5.0);
        group.bench_with_input(BenchmarkId::new("forward", size), &size, |b, _| {
            b.iter(|| black_box(fft.forward(black_box(&input))));
        });
    }
    group.finish();
}

fn bench_spectrogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("Spectrogram");
    for len in [10_000, 100_000, 1_000_000] {
        let input = generate_sine(len, 5.0);
        for window in [Window::Hann, Window::BlackmanHarris] {
            let config = SpectrogramConfig {
                window,
                ..SpectrogramConfig::default()
            };
            let analyzer = StftAnalyzer::new(SAMPLE_RATE, config).unwrap();
            group.bench_with_input(
                BenchmarkId::new(window.name(), len),
                &len,
                |b, _| b.iter(|| black_box(analyzer.analyze(black_box(&input)))),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_fft, bench_spectrogram);
criterion_main!(benches);
