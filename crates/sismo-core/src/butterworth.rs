//! Digital Butterworth design via analog prototype and bilinear transform.
//!
//! Design steps:
//!
//! 1. Analog low-pass prototype of order N: poles on the unit circle in the
//!    left half plane, `p_k = -exp(j*pi*m/(2N))` for `m = -N+1, -N+3, ..., N-1`.
//! 2. Pre-warp the cutoff(s): `w = 2*fs*tan(pi*f/fs)`.
//! 3. Frequency transform to low-pass, high-pass or band-pass.
//! 4. Bilinear transform `s -> 2*fs*(z-1)/(z+1)`.
//! 5. Group conjugate pole pairs into second-order sections.
//!
//! A band-pass of order N has 2N poles, so a 4-corner band-pass runs as four
//! sections while a 4-corner low- or high-pass runs as two.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::biquad::{Biquad, SosCascade};
use crate::error::{Error, Result};

/// Imaginary parts below this (relative to pole magnitude) count as real.
const REAL_POLE_TOLERANCE: f64 = 1e-10;

/// Response shape of a Butterworth design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    /// Passes frequencies below `cutoff_hz`.
    Lowpass {
        /// -3 dB corner in Hz.
        cutoff_hz: f64,
    },
    /// Passes frequencies above `cutoff_hz`.
    Highpass {
        /// -3 dB corner in Hz.
        cutoff_hz: f64,
    },
    /// Passes frequencies between `low_hz` and `high_hz`.
    Bandpass {
        /// Lower -3 dB corner in Hz.
        low_hz: f64,
        /// Upper -3 dB corner in Hz.
        high_hz: f64,
    },
}

impl Band {
    /// Checks every corner lies strictly inside `(0, nyquist)` and that band
    /// edges are ordered.
    pub fn validate(&self, sampling_rate_hz: f64) -> Result<()> {
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(Error::filter_parameter(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        let nyquist = sampling_rate_hz / 2.0;
        let check = |name: &str, f: f64| {
            if !f.is_finite() || f <= 0.0 {
                Err(Error::filter_parameter(format!(
                    "{name} must be positive and finite, got {f}"
                )))
            } else if f >= nyquist {
                Err(Error::filter_parameter(format!(
                    "{name} {f} Hz must be below the Nyquist frequency {nyquist} Hz"
                )))
            } else {
                Ok(())
            }
        };

        match *self {
            Band::Lowpass { cutoff_hz } | Band::Highpass { cutoff_hz } => check("cutoff", cutoff_hz),
            Band::Bandpass { low_hz, high_hz } => {
                check("low cutoff", low_hz)?;
                check("high cutoff", high_hz)?;
                if low_hz >= high_hz {
                    return Err(Error::filter_parameter(format!(
                        "low cutoff {low_hz} Hz must be below high cutoff {high_hz} Hz"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Zeros, poles and gain of a digital filter.
///
/// Butterworth designs only ever place zeros at `z = 1` or `z = -1`, so the
/// zeros are kept real.
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    /// Real zeros.
    pub zeros: Vec<f64>,
    /// Poles, closed under conjugation.
    pub poles: Vec<Complex64>,
    /// Overall gain.
    pub gain: f64,
}

/// Designs an `order`-corner digital Butterworth filter as a cascade of
/// second-order sections.
///
/// # Errors
///
/// [`Error::FilterParameter`] for an order of zero or corners outside
/// `(0, nyquist)`.
///
/// # Example
///
/// ```rust
/// use sismo_core::butterworth::{Band, design};
///
/// let sos = design(Band::Lowpass { cutoff_hz: 10.0 }, 4, 100.0).unwrap();
/// assert_eq!(sos.len(), 2);
/// assert!((sos.magnitude(0.0, 100.0) - 1.0).abs() < 1e-9);
/// ```
pub fn design(band: Band, order: usize, sampling_rate_hz: f64) -> Result<SosCascade> {
    let zpk = design_zpk(band, order, sampling_rate_hz)?;
    Ok(zpk_to_sos(&zpk))
}

/// Designs the digital zeros/poles/gain for a Butterworth filter.
pub fn design_zpk(band: Band, order: usize, sampling_rate_hz: f64) -> Result<Zpk> {
    if order == 0 {
        return Err(Error::filter_parameter("filter order must be at least 1"));
    }
    band.validate(sampling_rate_hz)?;

    let fs = sampling_rate_hz;
    let warp = |f: f64| 2.0 * fs * (PI * f / fs).tan();
    let prototype = prototype_poles(order);

    // Analog zeros are all at s = 0 (or none); track how many.
    let (analog_poles, analog_zeros_at_origin, analog_gain) = match band {
        Band::Lowpass { cutoff_hz } => {
            let wc = warp(cutoff_hz);
            let poles: Vec<Complex64> = prototype.iter().map(|&p| p * wc).collect();
            (poles, 0, wc.powi(order as i32))
        }
        Band::Highpass { cutoff_hz } => {
            let wc = warp(cutoff_hz);
            let poles: Vec<Complex64> = prototype.iter().map(|&p| wc / p).collect();
            let gain = 1.0 / prototype.iter().fold(Complex64::new(1.0, 0.0), |acc, &p| acc * -p).re;
            (poles, order, gain)
        }
        Band::Bandpass { low_hz, high_hz } => {
            let wl = warp(low_hz);
            let wh = warp(high_hz);
            let bw = wh - wl;
            let w0_sq = wl * wh;
            let mut poles = Vec::with_capacity(2 * order);
            for &p in &prototype {
                let p_lp = p * (bw / 2.0);
                let root = (p_lp * p_lp - w0_sq).sqrt();
                poles.push(p_lp + root);
                poles.push(p_lp - root);
            }
            (poles, order, bw.powi(order as i32))
        }
    };

    Ok(bilinear(&analog_poles, analog_zeros_at_origin, analog_gain, fs))
}

/// Analog Butterworth prototype poles (unit cutoff, gain 1).
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect()
}

/// Bilinear transform of an analog filter whose finite zeros all sit at the
/// origin.
fn bilinear(poles: &[Complex64], zeros_at_origin: usize, gain: f64, fs: f64) -> Zpk {
    let fs2 = 2.0 * fs;

    let digital_poles: Vec<Complex64> = poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();

    // s = 0 maps to z = 1; zeros at infinity map to z = -1.
    let at_infinity = poles.len() - zeros_at_origin;
    let mut zeros = Vec::with_capacity(poles.len());
    // Interleave so that every band-pass section receives one zero at each end.
    let paired = zeros_at_origin.min(at_infinity);
    for _ in 0..paired {
        zeros.push(1.0);
        zeros.push(-1.0);
    }
    zeros.extend(std::iter::repeat_n(1.0, zeros_at_origin - paired));
    zeros.extend(std::iter::repeat_n(-1.0, at_infinity - paired));

    let num = fs2.powi(zeros_at_origin as i32);
    let den = poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
    let digital_gain = gain * (Complex64::new(num, 0.0) / den).re;

    Zpk {
        zeros,
        poles: digital_poles,
        gain: digital_gain,
    }
}

/// Groups poles into sections: each conjugate pair (or pair of real poles)
/// becomes a biquad, a leftover real pole a first-order section. Zeros are
/// handed out in order, two per biquad; the gain goes into the first section.
pub fn zpk_to_sos(zpk: &Zpk) -> SosCascade {
    let mut complex_poles = Vec::new();
    let mut real_poles = Vec::new();
    for &p in &zpk.poles {
        if p.im.abs() <= REAL_POLE_TOLERANCE * p.norm().max(1.0) {
            real_poles.push(p.re);
        } else if p.im > 0.0 {
            complex_poles.push(p);
        }
    }
    real_poles.sort_by(|a, b| a.total_cmp(b));

    let mut zeros = zpk.zeros.iter().copied();
    let mut next_zero = || zeros.next().unwrap_or(0.0);
    let mut sections = Vec::with_capacity(zpk.poles.len().div_ceil(2));

    for p in complex_poles {
        let (z1, z2) = (next_zero(), next_zero());
        sections.push(Biquad::from_coefficients(
            [1.0, -(z1 + z2), z1 * z2],
            [1.0, -2.0 * p.re, p.norm_sqr()],
        ));
    }
    for pair in real_poles.chunks(2) {
        match *pair {
            [p1, p2] => {
                let (z1, z2) = (next_zero(), next_zero());
                sections.push(Biquad::from_coefficients(
                    [1.0, -(z1 + z2), z1 * z2],
                    [1.0, -(p1 + p2), p1 * p2],
                ));
            }
            [p] => {
                let z = next_zero();
                sections.push(Biquad::from_coefficients([1.0, -z, 0.0], [1.0, -p, 0.0]));
            }
            _ => unreachable!("chunks(2) yields one or two poles"),
        }
    }

    if let Some(first) = sections.first_mut() {
        first.scale(zpk.gain);
    }
    SosCascade::new(sections)
}
