//! Plot styling as an explicit value.

use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::plot::Layout;
use crate::{Error, Result};

/// Smallest panel edge, in pixels, that still yields a readable plot.
pub const MIN_PANEL_PX: u32 = 8;

/// Everything that controls how a trace and its spectrogram are drawn.
///
/// Unset fields in a TOML `[render]` table fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Spectrogram colormap.
    pub colormap: Colormap,
    /// Lower colour bound on the natural-log magnitude scale.
    pub spectrogram_vmin: f64,
    /// Upper colour bound; the largest log magnitude when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrogram_vmax: Option<f64>,
    /// Image background.
    pub background: [u8; 3],
    /// Waveform trace colour.
    pub waveform_color: [u8; 3],
    /// Frame, tick and zero-line colour.
    pub axis_color: [u8; 3],
    /// Blank border around the panels, in pixels.
    pub margin: u32,
    /// Vertical gap between the two panels, in pixels.
    pub panel_gap: u32,
    /// Tick mark length, in pixels.
    pub tick_length: u32,
    /// Panel title height, in pixels.
    pub title_font_px: f32,
    /// Axis label height, in pixels.
    pub label_font_px: f32,
    /// Tick value height, in pixels.
    pub tick_font_px: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            colormap: Colormap::Turbo,
            spectrogram_vmin: -1.0,
            spectrogram_vmax: None,
            background: [255, 255, 255],
            waveform_color: [0, 0, 0],
            axis_color: [64, 64, 64],
            margin: 20,
            panel_gap: 20,
            tick_length: 6,
            // 12 pt titles and 22 pt labels at 100 dpi
            title_font_px: 17.0,
            label_font_px: 31.0,
            tick_font_px: 31.0,
        }
    }
}

impl RenderConfig {
    /// Check that both panels get a usable area next to their text and the
    /// colour range is sane.
    pub fn validate(&self) -> Result<()> {
        for (name, px) in [
            ("title_font_px", self.title_font_px),
            ("label_font_px", self.label_font_px),
            ("tick_font_px", self.tick_font_px),
        ] {
            if !(px.is_finite() && px > 0.0) {
                return Err(Error::render(format!("{name} must be positive, got {px}")));
            }
        }
        if Layout::fit(self).is_none() {
            return Err(Error::render(format!(
                "{}x{} image with margin {} and gap {} leaves no room for the panels",
                self.width, self.height, self.margin, self.panel_gap
            )));
        }
        if !self.spectrogram_vmin.is_finite() {
            return Err(Error::render("spectrogram_vmin must be finite"));
        }
        if let Some(vmax) = self.spectrogram_vmax
            && (!vmax.is_finite() || vmax <= self.spectrogram_vmin)
        {
            return Err(Error::render(format!(
                "spectrogram_vmax ({vmax}) must be finite and above spectrogram_vmin ({})",
                self.spectrogram_vmin
            )));
        }
        Ok(())
    }
}
