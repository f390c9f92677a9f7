//! Mean removal.

use crate::error::{Error, Result};

/// Subtract the arithmetic mean from every sample.
///
/// `out[i] = samples[i] - mean(samples)`. The mean is accumulated with
/// compensated (Kahan) summation so long traces with a large DC offset still
/// come out centred.
///
/// # Errors
///
/// [`Error::InvalidInput`] when `samples` is empty.
///
/// # Example
///
/// ```rust
/// use sismo_core::detrend_mean;
///
/// let out = detrend_mean(&[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(out, vec![-1.0, 0.0, 1.0]);
/// ```
pub fn detrend_mean(samples: &[f64]) -> Result<Vec<f64>> {
    let mean = mean(samples)?;
    Ok(samples.iter().map(|&s| s - mean).collect())
}

/// Arithmetic mean of a non-empty slice.
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(Error::invalid_input("cannot detrend an empty sample sequence"));
    }

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &s in samples {
        let y = s - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    Ok(sum / samples.len() as f64)
}
