//! Pitch-shifted WAV conversion command.

use super::common::{FilterArgs, load_settings};
use crate::pipeline;
use clap::Args;
use sismo_io::{pitch_output_name, write_pcm16_wav};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ConvertArgs {
    /// Input miniSEED file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Playback-rate multiplier
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pitch: Option<i32>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Directory for the WAV (default: next to the input)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

pub fn run(args: ConvertArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let mut settings = load_settings(config)?;
    args.filter.apply(&mut settings);
    if let Some(pitch) = args.pitch {
        settings.convert.pitch_factor = pitch;
    }
    if let Some(dir) = &args.output_dir {
        settings.convert.output_dir = Some(dir.clone());
    }
    settings.validate()?;

    let trace = pipeline::load_trace(&args.input)?;
    let audio = pipeline::convert(&trace, &settings)?;

    let dir = match &settings.convert.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&dir)?;
    }
    let path = dir.join(pitch_output_name(&args.input, settings.convert.pitch_factor));
    write_pcm16_wav(&path, &audio)?;

    println!(
        "Wrote {} ({} samples, {} Hz, {:.2}s)",
        path.display(),
        audio.len(),
        audio.sample_rate_hz,
        audio.duration_secs()
    );
    Ok(())
}
