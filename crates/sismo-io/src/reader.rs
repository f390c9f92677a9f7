//! Container readers that produce core traces.

use std::path::Path;

use tracing::{debug, info};

use sismo_core::Trace;

use crate::miniseed::{MseedTrace, assemble_traces, parse_records};
use crate::{Error, Result};

/// Turns raw container bytes into the single [`Trace`] the pipeline works on.
pub trait SeismicReader {
    /// Short name of the container format, for messages.
    fn format_name(&self) -> &'static str;

    /// Decode `bytes` and return the first trace.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] when the bytes are not a recognised container or
    /// hold no samples.
    fn load(&self, bytes: &[u8]) -> Result<Trace>;
}

/// miniSEED 2.x reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniSeedReader;

impl MiniSeedReader {
    /// Create a reader.
    pub fn new() -> Self {
        Self
    }

    /// Every trace in the container, in order of first appearance.
    pub fn read_traces(&self, bytes: &[u8]) -> Result<Vec<MseedTrace>> {
        let traces = assemble_traces(parse_records(bytes)?);
        if traces.is_empty() {
            return Err(Error::format("container holds no data samples"));
        }
        Ok(traces)
    }
}

impl SeismicReader for MiniSeedReader {
    fn format_name(&self) -> &'static str {
        "miniSEED"
    }

    fn load(&self, bytes: &[u8]) -> Result<Trace> {
        let traces = self.read_traces(bytes)?;
        if traces.len() > 1 {
            debug!(ignored = traces.len() - 1, "using the first trace only");
        }
        let first = &traces[0];
        info!(
            id = %first.source_id,
            samples = first.samples.len(),
            rate_hz = first.sampling_rate_hz,
            start = %first.start_time,
            "loaded trace"
        );
        first.to_trace()
    }
}

/// Read `path` and decode it with `reader`.
pub fn load_file<R: SeismicReader + ?Sized>(reader: &R, path: impl AsRef<Path>) -> Result<Trace> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), format = reader.format_name(), "read input");
    reader.load(&bytes)
}
