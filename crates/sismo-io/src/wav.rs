//! WAV packaging for the 16-bit audio rendering.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sismo_core::AudioRendering;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels);
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

fn pcm16_spec(audio: &AudioRendering) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate_hz,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(writer: W, audio: &AudioRendering) -> Result<()> {
    let mut writer = WavWriter::new(writer, pcm16_spec(audio))?;
    for &sample in &audio.pcm {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Write a mono 16-bit WAV file at the rendering's declared rate.
pub fn write_pcm16_wav<P: AsRef<Path>>(path: P, audio: &AudioRendering) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_samples(file, audio)
}

/// Encode a mono 16-bit WAV file in memory.
pub fn encode_pcm16_wav(audio: &AudioRendering) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, audio)?;
    Ok(cursor.into_inner())
}

/// Read back a mono 16-bit PCM WAV file.
///
/// # Errors
///
/// [`Error::Format`] when the file is not mono 16-bit integer PCM.
pub fn read_pcm16_wav<P: AsRef<Path>>(path: P) -> Result<AudioRendering> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int
    {
        return Err(Error::format(format!(
            "expected mono 16-bit PCM, found {} channel(s) of {}-bit {:?}",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }
    let pcm = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(AudioRendering {
        sample_rate_hz: spec.sample_rate,
        pcm,
    })
}

/// Output file name for a converted input: `<stem>_pitch_<factor>.wav`.
///
/// Only the last extension is removed (`a.b.mseed` gives `a.b_pitch_2.wav`).
pub fn pitch_output_name(input: &Path, pitch_factor: i32) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_string());
    format!("{stem}_pitch_{pitch_factor}.wav")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(pitch_output_name(Path::new("data/event.mseed"), 4), "event_pitch_4.wav");
        assert_eq!(pitch_output_name(Path::new("a.b.mseed"), 1), "a.b_pitch_1.wav");
        assert_eq!(pitch_output_name(Path::new("noext"), 10), "noext_pitch_10.wav");
    }

    #[test]
    fn in_memory_wav_has_riff_header() {
        let audio = AudioRendering {
            sample_rate_hz: 200,
            pcm: vec![0, 32767, -32767, 5],
        };
        let bytes = encode_pcm16_wav(&audio).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 8);
        assert_eq!(&bytes[44..], audio.to_le_bytes().as_slice());
    }
}
