//! Biquad (second-order section) filter structure and cascades.
//!
//! A high-order IIR filter is run as a cascade of second-order sections,
//! which keeps the recursion numerically stable even for narrow bands at low
//! normalized frequencies (typical of seismic data).

use num_complex::Complex64;

/// Second-order IIR section.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// A first-order section is a biquad with `b2 = a2 = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    /// Feedforward coefficients
    b0: f64,
    b1: f64,
    b2: f64,

    /// Feedback coefficients (a0 normalized to 1)
    a1: f64,
    a2: f64,

    /// Input delay line: x[n-1], x[n-2]
    x1: f64,
    x2: f64,

    /// Output delay line: y[n-1], y[n-2]
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a biquad from `[b0, b1, b2]` / `[a0, a1, a2]` coefficient arrays.
    pub fn from_coefficients(b: [f64; 3], a: [f64; 3]) -> Self {
        let mut biquad = Self::new();
        biquad.set_coefficients(b[0], b[1], b[2], a[0], a[1], a[2]);
        biquad
    }

    /// Sets the biquad coefficients.
    ///
    /// Note: This function normalizes by a0 internally.
    pub fn set_coefficients(&mut self, b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Normalized coefficients as `([b0, b1, b2], [1, a1, a2])`.
    pub fn coefficients(&self) -> ([f64; 3], [f64; 3]) {
        ([self.b0, self.b1, self.b2], [1.0, self.a1, self.a2])
    }

    /// Multiplies the feedforward coefficients by `gain`.
    pub fn scale(&mut self, gain: f64) {
        self.b0 *= gain;
        self.b1 *= gain;
        self.b2 *= gain;
    }

    /// Processes a single sample through the section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state (delay lines).
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Complex response at normalized angular frequency `omega` (rad/sample).
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = 1.0 + z1 * self.a1 + z2 * self.a2;
        num / den
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Cascade of second-order sections applied in series.
///
/// Filtering is stateless from the caller's point of view: every call to
/// [`SosCascade::filter`] starts from cleared delay lines and leaves `self`
/// untouched, so the same cascade can be shared between consumers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SosCascade {
    sections: Vec<Biquad>,
}

impl SosCascade {
    /// Builds a cascade from sections, first section applied first.
    pub fn new(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// The sections in application order.
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True if the cascade has no sections (identity).
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Runs the cascade causally over `signal`, starting from rest.
    pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
        let mut sections = self.sections.clone();
        sections.iter_mut().for_each(Biquad::clear);

        signal
            .iter()
            .map(|&x| sections.iter_mut().fold(x, |acc, s| s.process(acc)))
            .collect()
    }

    /// Zero-phase filtering: forward pass, then a second pass over the
    /// time-reversed result, reversed back.
    ///
    /// The magnitude response is squared and the phase cancels, so events
    /// keep their timing. Both passes start from rest, without padding.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let mut forward = self.filter(signal);
        forward.reverse();
        let mut backward = self.filter(&forward);
        backward.reverse();
        backward
    }

    /// Complex response at `freq_hz` for a given sampling rate (single pass).
    pub fn response(&self, freq_hz: f64, sampling_rate_hz: f64) -> Complex64 {
        let omega = std::f64::consts::TAU * freq_hz / sampling_rate_hz;
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(omega))
    }

    /// Magnitude response at `freq_hz` (single pass).
    pub fn magnitude(&self, freq_hz: f64, sampling_rate_hz: f64) -> f64 {
        self.response(freq_hz, sampling_rate_hz).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_passthrough() {
        let mut biquad = Biquad::new();
        for x in [1.0, -0.5, 0.25, 3.0] {
            assert_eq!(biquad.process(x), x);
        }
    }

    #[test]
    fn coefficients_normalized_by_a0() {
        let biquad = Biquad::from_coefficients([2.0, 4.0, 6.0], [2.0, 1.0, 0.5]);
        let (b, a) = biquad.coefficients();
        assert_eq!(b, [1.0, 2.0, 3.0]);
        assert_eq!(a, [1.0, 0.5, 0.25]);
    }

    #[test]
    fn clear_resets_state() {
        let mut biquad = Biquad::from_coefficients([0.5, 0.5, 0.0], [1.0, -0.5, 0.0]);
        biquad.process(1.0);
        biquad.process(1.0);
        biquad.clear();
        let mut fresh = Biquad::from_coefficients([0.5, 0.5, 0.0], [1.0, -0.5, 0.0]);
        assert_eq!(biquad.process(0.3), fresh.process(0.3));
    }

    #[test]
    fn cascade_filter_does_not_mutate() {
        let cascade = SosCascade::new(vec![Biquad::from_coefficients(
            [0.2, 0.2, 0.0],
            [1.0, -0.6, 0.0],
        )]);
        let input = [1.0, 0.0, 0.0, 0.0];
        let first = cascade.filter(&input);
        let second = cascade.filter(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn response_at_dc_matches_coefficient_sums() {
        let biquad = Biquad::from_coefficients([1.0, 2.0, 1.0], [1.0, -0.2, 0.1]);
        let h = biquad.response(0.0);
        assert!((h.re - 4.0 / 0.9).abs() < 1e-12);
        assert!(h.im.abs() < 1e-12);
    }

    #[test]
    fn empty_cascade_is_identity() {
        let cascade = SosCascade::default();
        assert!(cascade.is_empty());
        assert_eq!(cascade.filtfilt(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }
}
