//! Display miniSEED trace metadata.

use clap::Args;
use sismo_io::MiniSeedReader;

/// List every trace in a miniSEED file.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the miniSEED file
    pub file: std::path::PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)?;
    let traces = MiniSeedReader::new().read_traces(&bytes)?;

    println!("File:   {}", args.file.display());
    println!("Size:   {}", format_bytes(bytes.len() as u64));
    println!("Traces: {}", traces.len());

    for (index, trace) in traces.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!(
            "{marker} {index:>3}  {}  {} - {}  {} Hz  {} samples  {} records",
            trace.source_id,
            trace.start_time.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            trace.end_time().format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            trace.sampling_rate_hz,
            trace.samples.len(),
            trace.record_count,
        );
    }
    if traces.len() > 1 {
        println!("(* = trace used by plot and convert)");
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::format_bytes;

    #[test]
    fn byte_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(4096), "4.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
