//! Synthetic miniSEED generation command.

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use sismo_io::{Encoding, MseedWriter, SourceId};
use std::path::PathBuf;

/// Sample encodings the writer supports.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliEncoding {
    #[default]
    Int32,
    Float64,
}

impl From<CliEncoding> for Encoding {
    fn from(e: CliEncoding) -> Self {
        match e {
            CliEncoding::Int32 => Encoding::Int32,
            CliEncoding::Float64 => Encoding::Float64,
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Output miniSEED file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sine frequency in Hz
    #[arg(long, default_value = "5.0")]
    frequency: f64,

    /// Sampling rate in Hz
    #[arg(long, default_value = "100.0")]
    sample_rate: f64,

    /// Duration in seconds
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Peak amplitude in counts
    #[arg(long, default_value = "1000.0")]
    amplitude: f64,

    /// Data encoding
    #[arg(long, value_enum, default_value_t = CliEncoding::Int32)]
    encoding: CliEncoding,

    /// Source identifier
    #[arg(long, default_value = "XX.SYN..HHZ", value_name = "NET.STA.LOC.CHA")]
    source_id: String,

    /// Start time (RFC 3339)
    #[arg(long, default_value = "2000-01-01T00:00:00Z")]
    start: DateTime<Utc>,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if !(args.sample_rate.is_finite() && args.sample_rate > 0.0) {
        anyhow::bail!("sample rate must be positive, got {}", args.sample_rate);
    }
    let n = (args.duration * args.sample_rate).round();
    if !(n.is_finite() && n >= 1.0) {
        anyhow::bail!(
            "{} s at {} Hz yields no samples",
            args.duration,
            args.sample_rate
        );
    }
    let source_id: SourceId = args.source_id.parse()?;

    let samples = sine(args.frequency, args.sample_rate, n as usize, args.amplitude);
    let bytes = MseedWriter::new(args.encoding.into())?.write(
        &source_id,
        args.start,
        args.sample_rate,
        &samples,
    )?;
    std::fs::write(&args.output, &bytes)?;

    println!(
        "Generated {} ({} samples of {} Hz sine at {} Hz, {})",
        args.output.display(),
        samples.len(),
        args.frequency,
        args.sample_rate,
        source_id
    );
    Ok(())
}

fn sine(frequency: f64, sample_rate: f64, n: usize, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (std::f64::consts::TAU * frequency * i as f64 / sample_rate).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sine;

    #[test]
    fn sine_peaks_at_quarter_period() {
        let s = sine(5.0, 100.0, 1000, 1000.0);
        assert_eq!(s.len(), 1000);
        assert!((s[5] - 1000.0).abs() < 1e-9);
        assert!(s[0].abs() < 1e-12);
    }
}
