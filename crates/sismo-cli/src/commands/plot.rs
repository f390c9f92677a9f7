//! Waveform and spectrogram plot command.

use super::common::{FilterArgs, display_name, load_settings};
use crate::pipeline::{self, PlotPayload};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PlotArgs {
    /// Input miniSEED file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,

    /// Output PNG (default: <input stem>.png next to the input, unless --json)
    #[arg(short, long, value_name = "OUT.png")]
    output: Option<PathBuf>,

    /// Print {"plot": <base64 PNG>, "filename": <input name>} to stdout
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlotArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let mut settings = load_settings(config)?;
    args.filter.apply(&mut settings);
    settings.validate()?;

    let trace = pipeline::load_trace(&args.input)?;
    let png = pipeline::plot(&trace, &settings)?;

    let output = match (&args.output, args.json) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(args.input.with_extension("png")),
        (None, true) => None,
    };
    if let Some(path) = &output {
        std::fs::write(path, &png)?;
        tracing::info!(path = %path.display(), bytes = png.len(), "wrote plot");
    }

    if args.json {
        let payload = PlotPayload::new(&png, display_name(&args.input));
        println!("{}", serde_json::to_string(&payload)?);
    } else if let Some(path) = output {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
