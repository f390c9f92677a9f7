//! Perceptually ordered colormaps.

use serde::{Deserialize, Serialize};

/// Colormap used for the spectrogram panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Colormap {
    /// Google's turbo rainbow.
    #[default]
    Turbo,
    /// Matplotlib viridis.
    Viridis,
    /// Matplotlib magma.
    Magma,
    /// Matplotlib inferno.
    Inferno,
    /// Matplotlib plasma.
    Plasma,
    /// Colour-vision-deficiency friendly cividis.
    Cividis,
}

impl Colormap {
    fn gradient(self) -> colorous::Gradient {
        match self {
            Colormap::Turbo => colorous::TURBO,
            Colormap::Viridis => colorous::VIRIDIS,
            Colormap::Magma => colorous::MAGMA,
            Colormap::Inferno => colorous::INFERNO,
            Colormap::Plasma => colorous::PLASMA,
            Colormap::Cividis => colorous::CIVIDIS,
        }
    }

    /// Colour at position `t`, clamped to `[0, 1]`. NaN maps to the low end.
    #[inline]
    pub fn rgb(self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let c = self.gradient().eval_continuous(t);
        [c.r, c.g, c.b]
    }

    /// Colour of `value` normalised linearly between `vmin` and `vmax`.
    ///
    /// Values outside the range take the end colours.
    pub fn map(self, value: f64, vmin: f64, vmax: f64) -> [u8; 3] {
        self.rgb((value - vmin) / (vmax - vmin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_are_clamped() {
        let cmap = Colormap::Viridis;
        assert_eq!(cmap.rgb(-3.0), cmap.rgb(0.0));
        assert_eq!(cmap.rgb(7.0), cmap.rgb(1.0));
        assert_eq!(cmap.rgb(f64::NAN), cmap.rgb(0.0));
    }

    #[test]
    fn map_normalises() {
        let cmap = Colormap::Turbo;
        assert_eq!(cmap.map(-1.0, -1.0, 3.0), cmap.rgb(0.0));
        assert_eq!(cmap.map(1.0, -1.0, 3.0), cmap.rgb(0.5));
        assert_ne!(cmap.rgb(0.0), cmap.rgb(1.0));
    }
}
