//! Integration tests for sismo-core.
//!
//! Runs full conditioning chains (detrend, filter, PCM) on synthetic sine
//! traces and checks the signal-level results: sample rates, peak levels,
//! stop-band residuals and zero-phase symmetry.

use sismo_core::{
    Band, Conditioning, Error, FilterSpec, Trace, ZeroPhaseFilter, bandpass, detrend_mean,
    to_pcm16,
};

const FS: f64 = 100.0;
const TAU: f64 = std::f64::consts::TAU;

/// Sine of unit amplitude at `freq_hz`, `num_samples` long, sampled at [`FS`].
fn generate_sine(freq_hz: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|n| (TAU * freq_hz * n as f64 / FS).sin())
        .collect()
}

fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0_f64, |m, &s| m.max(s.abs()))
}

fn rms(signal: &[f64]) -> f64 {
    (signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64).sqrt()
}

// ============================================================================
// 1. Audio rendering
// ============================================================================

#[test]
fn unfiltered_sine_renders_at_doubled_rate() {
    let trace = Trace::new(generate_sine(5.0, 1000), FS).unwrap();
    let conditioned = Conditioning::for_convert(FilterSpec::NONE).apply(&trace).unwrap();

    let audio = to_pcm16(conditioned.samples(), trace.sampling_rate_hz(), 2).unwrap();
    assert_eq!(audio.sample_rate_hz, 200);
    assert_eq!(audio.pcm.len(), 1000);
    assert_eq!(audio.pcm.iter().map(|s| s.abs()).max(), Some(32767));
    assert!(audio.pcm.iter().all(|&s| s != i16::MIN));
}

#[test]
fn pitch_factor_one_keeps_rate() {
    let audio = to_pcm16(&generate_sine(3.0, 256), 40.0, 1).unwrap();
    assert_eq!(audio.sample_rate_hz, 40);
}

#[test]
fn zero_pitch_factor_rejected_after_filtering() {
    let filtered = bandpass(&generate_sine(1.0, 500), 0.0, 10.0, FS).unwrap();
    assert!(matches!(
        to_pcm16(&filtered, FS, 0),
        Err(Error::InvalidParameter(_))
    ));
}

// ============================================================================
// 2. Filtering
// ============================================================================

#[test]
fn highpass_above_tone_leaves_small_residual() {
    let x = generate_sine(5.0, 1000);
    let y = bandpass(&x, 20.0, 0.0, FS).unwrap();
    assert_eq!(y.len(), x.len());

    // Edge transients excluded: first and last second.
    let interior = &y[100..900];
    assert!(peak(interior) < 0.01, "residual peak {}", peak(interior));
    assert!(y.iter().any(|&s| s != 0.0));

    // No edge padding: the ends ring above the interior but stay well below
    // the input amplitude.
    assert!(peak(&y) > peak(interior));
    assert!(peak(&y) < 0.1, "edge peak {}", peak(&y));

    // Residual is tiny but not silent, so it still renders.
    assert!(to_pcm16(&y, FS, 2).is_ok());
}

#[test]
fn bandpass_at_nyquist_is_rejected() {
    let x = generate_sine(1.0, 100);
    assert!(matches!(
        bandpass(&x, 1.0, 50.0, FS),
        Err(Error::FilterParameter(_))
    ));
    assert!(matches!(
        bandpass(&x, 10.0, 5.0, FS),
        Err(Error::FilterParameter(_))
    ));
}

#[test]
fn zero_phase_impulse_response_is_symmetric() {
    let n = 4001;
    let centre = n / 2;
    let mut impulse = vec![0.0; n];
    impulse[centre] = 1.0;

    let y = bandpass(&impulse, 2.0, 10.0, FS).unwrap();

    let argmax = y
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0;
    assert_eq!(argmax, centre);

    let tolerance = 1e-4 * y[centre].abs();
    for k in 1..1000 {
        let diff = (y[centre - k] - y[centre + k]).abs();
        assert!(diff <= tolerance, "asymmetry {diff} at lag {k}");
    }
}

#[test]
fn filter_response_passes_centre_of_band() {
    let filter =
        ZeroPhaseFilter::new(Band::Bandpass { low_hz: 1.0, high_hz: 8.0 }, 4, FS).unwrap();
    let x = generate_sine(3.0, 6000);
    let y = filter.apply(&x);
    let ratio = rms(&y[1000..5000]) / rms(&x[1000..5000]);
    assert!((ratio - 1.0).abs() < 0.02, "passband ratio {ratio}");
    assert!(filter.magnitude(30.0) < 1e-4);
}

// ============================================================================
// 3. Conditioning presets
// ============================================================================

#[test]
fn plot_preset_removes_offset_before_lowpass() {
    let samples: Vec<f64> = generate_sine(0.5, 2000).iter().map(|s| s + 50.0).collect();
    let trace = Trace::new(samples, FS).unwrap().with_id("XX.TEST..HHZ");

    let out = Conditioning::for_plot(FilterSpec::new(0.0, 5.0)).apply(&trace).unwrap();
    assert_eq!(out.id(), "XX.TEST..HHZ");
    assert!(peak(&out.samples()[500..1500]) < 1.05);

    let raw = Conditioning::for_convert(FilterSpec::new(0.0, 5.0)).apply(&trace).unwrap();
    assert!(raw.samples()[1000] > 40.0);
}

#[test]
fn detrend_then_silent_signal() {
    let constant = vec![7.5; 64];
    let detrended = detrend_mean(&constant).unwrap();
    assert!(detrended.iter().all(|&s| s.abs() < 1e-12));

    let exact_zero: Vec<f64> = detrended.iter().map(|_| 0.0).collect();
    assert_eq!(to_pcm16(&exact_zero, FS, 1), Err(Error::SilentSignal));
}
