//! Two-panel plot: waveform on top, log-magnitude spectrogram below.
//!
//! Each panel carries a title above it, "Time (s)" below it and its own
//! axis label rotated in the left margin, with tick values next to the ticks.
//!
//! Columns map linearly onto `[0, duration]` in both panels. The waveform is
//! drawn as a min/max envelope per column; the spectrogram is a smoothly
//! shaded mesh whose vertices sit at the STFT frame centres and bin
//! frequencies, with colour levels interpolated bilinearly between them.

use image::RgbImage;
use sismo_analysis::Spectrogram;
use sismo_core::Trace;

use crate::canvas::{Canvas, Rect};
use crate::config::{MIN_PANEL_PX, RenderConfig};
use crate::text::{Label, TextRenderer};
use crate::{Error, Result};

/// Minimum spacing between time ticks, in pixels.
const TIME_TICK_SPACING_PX: u32 = 100;
/// Minimum spacing between frequency and amplitude ticks, in pixels.
const FREQ_TICK_SPACING_PX: u32 = 50;
/// Gap between a text item and whatever it annotates.
const TEXT_PAD_PX: u32 = 8;
/// Width reserved for vertical-axis tick values, in multiples of their height.
const TICK_LABEL_EMS: f32 = 3.0;

/// Pixel areas of the two panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Waveform panel.
    pub waveform: Rect,
    /// Spectrogram panel.
    pub spectrogram: Rect,
}

/// Whole pixels taken by text of height `size`.
fn text_px(size: f32) -> u32 {
    size.ceil() as u32
}

impl Layout {
    /// Split the image into two equal-width panels stacked vertically.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        Self::fit(config).ok_or_else(|| Error::render("panels do not fit the image"))
    }

    /// Panel areas after reserving room for titles, axis labels and tick
    /// values, or `None` when a panel would be smaller than [`MIN_PANEL_PX`].
    pub fn fit(config: &RenderConfig) -> Option<Self> {
        let pad = u64::from(TEXT_PAD_PX);
        let margin = u64::from(config.margin);
        let tick_len = u64::from(config.tick_length);
        let title = u64::from(text_px(config.title_font_px));
        let label = u64::from(text_px(config.label_font_px));
        let tick = u64::from(text_px(config.tick_font_px));
        let tick_text = u64::from(text_px(config.tick_font_px * TICK_LABEL_EMS));

        let left = margin + label + pad + tick_text + pad / 2 + tick_len;
        // The last time value is centred on the right edge.
        let right = margin + tick;
        let above = title + pad;
        let below = tick_len + pad / 2 + tick + pad / 2 + label;

        let inner_w = u64::from(config.width).checked_sub(left + right)?;
        let inner_h = u64::from(config.height)
            .checked_sub(2 * margin + 2 * (above + below) + u64::from(config.panel_gap))?;
        let top_h = inner_h / 2;
        if inner_w < u64::from(MIN_PANEL_PX) || top_h < u64::from(MIN_PANEL_PX) {
            return None;
        }

        let waveform_y = margin + above;
        let spectrogram_y = waveform_y + top_h + below + u64::from(config.panel_gap) + above;
        let rect = |y: u64, h: u64| -> Option<Rect> {
            Some(Rect::new(
                u32::try_from(left).ok()?,
                u32::try_from(y).ok()?,
                u32::try_from(inner_w).ok()?,
                u32::try_from(h).ok()?,
            ))
        };
        Some(Self {
            waveform: rect(waveform_y, top_h)?,
            spectrogram: rect(spectrogram_y, inner_h - top_h)?,
        })
    }
}

/// Render `trace` and its `spectrogram` to PNG bytes.
pub fn render(trace: &Trace, spectrogram: &Spectrogram, config: &RenderConfig) -> Result<Vec<u8>> {
    let canvas = draw(trace, spectrogram, config)?;
    canvas.encode_png()
}

/// Render to an in-memory image without encoding.
pub fn render_image(trace: &Trace, spectrogram: &Spectrogram, config: &RenderConfig) -> Result<RgbImage> {
    Ok(draw(trace, spectrogram, config)?.into_image())
}

fn draw(trace: &Trace, spectrogram: &Spectrogram, config: &RenderConfig) -> Result<Canvas> {
    check_spectrogram(spectrogram)?;
    let layout = Layout::new(config)?;
    let text = TextRenderer::new()?;
    let duration = trace.duration_secs();

    let mut canvas = Canvas::new(config.width, config.height, config.background);
    let limit = amplitude_limit(trace);
    draw_waveform(&mut canvas, layout.waveform, trace, limit, config);
    draw_spectrogram(&mut canvas, layout.spectrogram, spectrogram, duration, config);

    let panels = [
        (layout.waveform, "Waveform", "Amplitude"),
        (layout.spectrogram, "Spectrogram", "Frequency (Hz)"),
    ];
    for (rect, title, y_label) in panels {
        canvas.frame(rect, config.axis_color);
        draw_time_ticks(&mut canvas, &text, rect, duration, config);
        draw_titles(&mut canvas, &text, rect, title, y_label, config);
    }
    draw_amplitude_ticks(&mut canvas, &text, layout.waveform, limit, config);
    draw_frequency_ticks(
        &mut canvas,
        &text,
        layout.spectrogram,
        spectrogram.sampling_rate_hz / 2.0,
        config,
    );
    Ok(canvas)
}

fn check_spectrogram(spec: &Spectrogram) -> Result<()> {
    let bins = spec.num_bins();
    let frames = spec.num_frames();
    let ragged = spec.magnitudes.iter().any(|row| row.len() != frames);
    if bins == 0 || frames == 0 || ragged || spec.freqs.len() != bins || spec.times.len() != frames {
        return Err(Error::from(sismo_core::Error::invalid_input(format!(
            "spectrogram shape is inconsistent: {bins} bins x {frames} frames, {} freqs, {} times",
            spec.freqs.len(),
            spec.times.len()
        ))));
    }
    if !(spec.sampling_rate_hz.is_finite() && spec.sampling_rate_hz > 0.0) {
        return Err(Error::from(sismo_core::Error::invalid_input(
            "spectrogram sampling rate must be positive",
        )));
    }
    Ok(())
}

/// Row for amplitude `value` on a symmetric `[-limit, limit]` axis.
fn amplitude_row(rect: Rect, value: f64, limit: f64) -> u32 {
    let frac = ((limit - value) / (2.0 * limit)).clamp(0.0, 1.0);
    rect.y + (frac * f64::from(rect.height - 1)).round() as u32
}

/// Half-height of the amplitude axis: the peak, or 1 for a flat trace.
fn amplitude_limit(trace: &Trace) -> f64 {
    let peak = trace.peak_abs();
    if peak > 0.0 && peak.is_finite() { peak } else { 1.0 }
}

fn draw_waveform(canvas: &mut Canvas, rect: Rect, trace: &Trace, limit: f64, config: &RenderConfig) {
    let right = rect.right() - 1;
    canvas.hline(rect.x, right, amplitude_row(rect, 0.0, limit), config.axis_color);

    let samples = trace.samples();
    let n = samples.len();
    let width = rect.width as usize;
    for col in 0..width {
        let start = col * n / width;
        if start >= n {
            break;
        }
        let end = ((col + 1) * n / width).clamp(start + 1, n);
        // Reach back one sample so neighbouring columns join up.
        let from = start.saturating_sub(usize::from(col > 0));

        let (lo, hi) = samples[from..end]
            .iter()
            .filter(|s| s.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        if lo > hi {
            continue;
        }
        canvas.vline(
            rect.x + col as u32,
            amplitude_row(rect, hi, limit),
            amplitude_row(rect, lo, limit),
            config.waveform_color,
        );
    }
}

/// Lower and upper colour bounds on the log scale.
///
/// The floor is always the configured `spectrogram_vmin`. The ceiling is the
/// configured `spectrogram_vmax`, else the data maximum, else `vmin + 1` when
/// nothing rises above the floor.
fn color_range(logs: &[Vec<f64>], config: &RenderConfig) -> (f64, f64) {
    let vmin = config.spectrogram_vmin;
    let data_max = logs.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let vmax = match config.spectrogram_vmax {
        Some(v) => v,
        None if data_max > vmin => data_max,
        None => vmin + 1.0,
    };
    (vmin, vmax)
}

/// Colour levels in `[0, 1]` per `[bin][frame]` vertex.
fn vertex_levels(spec: &Spectrogram, config: &RenderConfig) -> Vec<Vec<f64>> {
    let logs = spec.log_magnitudes();
    let (vmin, vmax) = color_range(&logs, config);
    logs.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| ((v - vmin) / (vmax - vmin)).clamp(0.0, 1.0))
                .collect()
        })
        .collect()
}

/// Bilinear level at fractional `(bin, frame)` coordinates.
fn interpolate(levels: &[Vec<f64>], bin: f64, frame: f64) -> f64 {
    let b0 = (bin.floor() as usize).min(levels.len() - 1);
    let b1 = (b0 + 1).min(levels.len() - 1);
    let f0 = (frame.floor() as usize).min(levels[0].len() - 1);
    let f1 = (f0 + 1).min(levels[0].len() - 1);
    let wb = (bin - b0 as f64).clamp(0.0, 1.0);
    let wf = (frame - f0 as f64).clamp(0.0, 1.0);

    let low = levels[b0][f0] * (1.0 - wf) + levels[b0][f1] * wf;
    let high = levels[b1][f0] * (1.0 - wf) + levels[b1][f1] * wf;
    low * (1.0 - wb) + high * wb
}

/// Fractional frame index for time `t`, or `None` outside the mesh.
///
/// A single frame has no extent of its own and is stretched across the panel.
fn frame_position(times: &[f64], t: f64) -> Option<f64> {
    let (first, last) = (times[0], times[times.len() - 1]);
    if times.len() == 1 {
        return Some(0.0);
    }
    if t < first || t > last {
        return None;
    }
    Some((t - first) / (last - first) * (times.len() - 1) as f64)
}

fn draw_spectrogram(
    canvas: &mut Canvas,
    rect: Rect,
    spec: &Spectrogram,
    duration: f64,
    config: &RenderConfig,
) {
    let levels = vertex_levels(spec, config);
    let nyquist = spec.sampling_rate_hz / 2.0;
    let bins = spec.num_bins();
    let top_freq = spec.freqs[bins - 1].max(f64::MIN_POSITIVE);

    // Row 0 is the highest frequency.
    let row_bins: Vec<f64> = (0..rect.height)
        .map(|row| {
            let freq = (1.0 - (f64::from(row) + 0.5) / f64::from(rect.height)) * nyquist;
            freq / top_freq * (bins - 1) as f64
        })
        .collect();

    for col in 0..rect.width {
        let t = (f64::from(col) + 0.5) / f64::from(rect.width) * duration;
        let Some(frame) = frame_position(&spec.times, t) else {
            continue;
        };
        for (row, &bin) in row_bins.iter().enumerate() {
            let level = interpolate(&levels, bin, frame);
            canvas.put(rect.x + col, rect.y + row as u32, config.colormap.rgb(level));
        }
    }
}

/// Smallest interval from the 1-2-5 progression that keeps ticks at least
/// `min_spacing_px` apart when `span` covers `length_px` pixels.
pub(crate) fn tick_interval(span: f64, length_px: u32, min_spacing_px: u32) -> f64 {
    if !(span.is_finite() && span > 0.0) || length_px == 0 {
        return 1.0;
    }
    let target = span * f64::from(min_spacing_px) / f64::from(length_px);
    let decade = 10f64.powf(target.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * decade)
        .find(|&step| step >= target * (1.0 - 1e-9))
        .unwrap_or(10.0 * decade)
}

/// Tick value text with as many decimals as the step needs.
fn format_tick(value: f64, step: f64) -> String {
    // Snap accumulated rounding error, and -0, to zero.
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    let magnitude = value.abs();
    if magnitude >= 1e5 || (magnitude > 0.0 && step < 1e-3) {
        return format!("{value:.1e}");
    }
    let decimals = (-(step.log10() + 1e-9).floor()).max(0.0) as usize;
    format!("{value:.decimals$}")
}

/// Multiples of `step` covering `[low, high]`.
fn tick_values(low: f64, high: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (low / step - 1e-9).ceil() as i64;
    let last = (high / step + 1e-9).floor() as i64;
    (first..=last).map(move |k| k as f64 * step)
}

fn signed(v: u32) -> i64 {
    i64::from(v)
}

/// Horizontally centre `label` on `x` with its top at `y`.
fn draw_centred(canvas: &mut Canvas, label: &Label, x: i64, y: i64, color: [u8; 3]) {
    label.draw(canvas, x - signed(label.width()) / 2, y, color);
}

/// Draw `label` ending at column `right`, vertically centred on row `y`.
fn draw_right_aligned(canvas: &mut Canvas, label: &Label, right: i64, y: i64, color: [u8; 3]) {
    label.draw(canvas, right - signed(label.width()), y - signed(label.height()) / 2, color);
}

fn draw_titles(
    canvas: &mut Canvas,
    text: &TextRenderer,
    rect: Rect,
    title: &str,
    y_label: &str,
    config: &RenderConfig,
) {
    let centre = signed(rect.x) + signed(rect.width) / 2;
    let pad = signed(TEXT_PAD_PX);

    let title = text.rasterize(title, config.title_font_px);
    let title_top = signed(rect.y) - pad / 2 - signed(title.height());
    draw_centred(canvas, &title, centre, title_top, config.axis_color);

    let x_label = text.rasterize("Time (s)", config.label_font_px);
    let x_label_top = signed(rect.bottom())
        + signed(config.tick_length)
        + pad
        + signed(text_px(config.tick_font_px));
    draw_centred(canvas, &x_label, centre, x_label_top, config.axis_color);

    let y_label = text.rasterize(y_label, config.label_font_px);
    let middle = signed(rect.y) + signed(rect.height) / 2;
    y_label.draw_rotated(
        canvas,
        signed(config.margin),
        middle - signed(y_label.width()) / 2,
        config.axis_color,
    );
}

fn draw_time_ticks(canvas: &mut Canvas, text: &TextRenderer, rect: Rect, duration: f64, config: &RenderConfig) {
    let spacing = TIME_TICK_SPACING_PX.max(text_px(config.tick_font_px).saturating_mul(4));
    let step = tick_interval(duration, rect.width, spacing);
    let span = duration.max(0.0);
    let label_top = signed(rect.bottom() + config.tick_length) + signed(TEXT_PAD_PX) / 2;
    for t in tick_values(0.0, span, step) {
        let x = if span > 0.0 {
            rect.x + ((t / span) * f64::from(rect.width - 1)).round() as u32
        } else {
            rect.x
        };
        canvas.vline(x, rect.bottom(), rect.bottom() + config.tick_length, config.axis_color);
        let label = text.rasterize(&format_tick(t, step), config.tick_font_px);
        draw_centred(canvas, &label, signed(x), label_top, config.axis_color);
    }
}

/// Tick mark and value on the left edge of `rect` at row `y`.
fn draw_y_tick(canvas: &mut Canvas, text: &TextRenderer, rect: Rect, y: u32, value: &str, config: &RenderConfig) {
    let left = rect.x.saturating_sub(config.tick_length);
    canvas.hline(left, rect.x.saturating_sub(1), y, config.axis_color);
    let label = text.rasterize(value, config.tick_font_px);
    let right = signed(left) - signed(TEXT_PAD_PX) / 2;
    draw_right_aligned(canvas, &label, right, signed(y), config.axis_color);
}

fn vertical_tick_spacing(config: &RenderConfig) -> u32 {
    FREQ_TICK_SPACING_PX.max(text_px(config.tick_font_px).saturating_mul(2))
}

fn draw_amplitude_ticks(canvas: &mut Canvas, text: &TextRenderer, rect: Rect, limit: f64, config: &RenderConfig) {
    let step = tick_interval(2.0 * limit, rect.height, vertical_tick_spacing(config));
    for value in tick_values(-limit, limit, step) {
        let y = amplitude_row(rect, value, limit);
        draw_y_tick(canvas, text, rect, y, &format_tick(value, step), config);
    }
}

fn draw_frequency_ticks(canvas: &mut Canvas, text: &TextRenderer, rect: Rect, nyquist: f64, config: &RenderConfig) {
    let step = tick_interval(nyquist, rect.height, vertical_tick_spacing(config));
    for f in tick_values(0.0, nyquist, step) {
        let y = rect.bottom() - 1 - ((f / nyquist) * f64::from(rect.height - 1)).round() as u32;
        draw_y_tick(canvas, text, rect, y, &format_tick(f, step), config);
    }
}
