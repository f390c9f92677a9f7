//! Request pipelines shared by the commands.
//!
//! Plot: load -> detrend -> filter -> STFT -> PNG.
//! Convert: load -> filter -> PCM16 at `rate * pitch`.

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sismo_analysis::StftAnalyzer;
use sismo_config::Settings;
use sismo_core::{AudioRendering, Trace, to_pcm16};
use sismo_io::{MiniSeedReader, load_file};
use std::path::Path;
use tracing::{debug, info};

/// JSON body emitted by `plot --json`.
#[derive(Debug, Serialize)]
pub struct PlotPayload {
    /// Base64-encoded PNG.
    pub plot: String,
    /// Echoed input label.
    pub filename: String,
}

impl PlotPayload {
    /// Wrap PNG bytes with their label.
    pub fn new(png: &[u8], filename: impl Into<String>) -> Self {
        Self {
            plot: STANDARD.encode(png),
            filename: filename.into(),
        }
    }
}

/// Read the first trace of a miniSEED file.
pub fn load_trace(path: &Path) -> anyhow::Result<Trace> {
    let trace = load_file(&MiniSeedReader::new(), path)
        .with_context(|| format!("cannot load '{}'", path.display()))?;
    info!(
        id = trace.id(),
        samples = trace.len(),
        rate_hz = trace.sampling_rate_hz(),
        "loaded trace"
    );
    Ok(trace)
}

/// Condition `trace` for display and render the two-panel PNG.
pub fn plot(trace: &Trace, settings: &Settings) -> anyhow::Result<Vec<u8>> {
    let conditioning = settings.plot_conditioning();
    debug!(?conditioning, "plot conditioning");
    let conditioned = conditioning.apply(trace)?;

    let analyzer = StftAnalyzer::new(conditioned.sampling_rate_hz(), settings.spectrogram)?;
    let spectrogram = analyzer.analyze(conditioned.samples())?;
    debug!(
        bins = spectrogram.num_bins(),
        frames = spectrogram.num_frames(),
        "spectrogram"
    );

    Ok(sismo_render::render(&conditioned, &spectrogram, &settings.render)?)
}

/// Condition `trace` for listening and quantize it to 16-bit PCM.
pub fn convert(trace: &Trace, settings: &Settings) -> anyhow::Result<AudioRendering> {
    let conditioning = settings.convert_conditioning();
    debug!(?conditioning, "convert conditioning");
    let conditioned = conditioning.apply(trace)?;
    Ok(to_pcm16(
        conditioned.samples(),
        conditioned.sampling_rate_hz(),
        settings.convert.pitch_factor,
    )?)
}
