//! Sismo CLI - plot and sonify miniSEED seismic traces.

mod commands;
mod pipeline;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sismo")]
#[command(author, version, about = "Seismic trace plotting and sonification", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/sismo/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render waveform and spectrogram to PNG
    Plot(commands::plot::PlotArgs),

    /// Render a pitch-shifted 16-bit WAV
    Convert(commands::convert::ConvertArgs),

    /// List the traces in a miniSEED file
    Info(commands::info::InfoArgs),

    /// Write a synthetic sine trace as miniSEED
    Generate(commands::generate::GenerateArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Plot(args) => commands::plot::run(args, config),
        Commands::Convert(args) => commands::convert::run(args, config),
        Commands::Info(args) => commands::info::run(args),
        Commands::Generate(args) => commands::generate::run(args),
    }
}
