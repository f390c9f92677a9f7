//! Container I/O for sismo.
//!
//! This crate provides:
//!
//! - **miniSEED reading**: [`MiniSeedReader`] decodes SEED 2.x data records
//!   (INT16/INT32/FLOAT32/FLOAT64, Steim-1, Steim-2, either byte order) and
//!   merges contiguous records into traces
//! - **miniSEED writing**: [`MseedWriter`] produces INT32 or FLOAT64 records,
//!   used to generate synthetic test data
//! - **WAV packaging**: [`write_pcm16_wav`] and [`encode_pcm16_wav`] for the
//!   16-bit mono audio rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sismo_io::{MiniSeedReader, SeismicReader, write_pcm16_wav};
//!
//! let bytes = std::fs::read("event.mseed")?;
//! let trace = MiniSeedReader::new().load(&bytes)?;
//! let audio = sismo_core::to_pcm16(trace.samples(), trace.sampling_rate_hz(), 4)?;
//! write_pcm16_wav("event_pitch_4.wav", &audio)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod miniseed;
mod reader;
mod steim;
mod wav;
mod writer;

pub use miniseed::{
    ByteOrder, Encoding, MseedTrace, Record, RecordHeader, SourceId, assemble_traces,
    parse_records,
};
pub use reader::{MiniSeedReader, SeismicReader, load_file};
pub use steim::{decode_steim1, decode_steim2};
pub use wav::{
    WavFormat, WavInfo, encode_pcm16_wav, pitch_output_name, read_pcm16_wav, read_wav_info,
    write_pcm16_wav,
};
pub use writer::{DEFAULT_RECORD_LENGTH, MseedWriter};

/// Error types for container I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bytes are not a recognised seismic container, or hold no samples.
    #[error("format error: {0}")]
    Format(String),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A decoded trace failed core validation.
    #[error(transparent)]
    Core(#[from] sismo_core::Error),
}

impl Error {
    /// Create a format error.
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format(reason.into())
    }
}

/// Convenience result type for container I/O.
pub type Result<T> = std::result::Result<T, Error>;
