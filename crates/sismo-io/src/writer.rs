//! miniSEED 2.x record writer for uncompressed INT32 and FLOAT64 data.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use tracing::debug;

use crate::miniseed::{Encoding, FIXED_HEADER_LEN, SourceId};
use crate::{Error, Result};

/// Record length used unless overridden.
pub const DEFAULT_RECORD_LENGTH: usize = 512;

const BLOCKETTE_1000_LEN: usize = 8;
const BLOCKETTE_100_LEN: usize = 12;
const DATA_ALIGNMENT: usize = 64;
const MAX_SEQUENCE: u32 = 999_999;

/// Writes a single trace as a sequence of big-endian data records.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use sismo_io::{Encoding, MiniSeedReader, MseedWriter, SeismicReader, SourceId};
///
/// let id: SourceId = "XX.SYN..HHZ".parse().unwrap();
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let samples: Vec<f64> = (0..300).map(f64::from).collect();
///
/// let bytes = MseedWriter::new(Encoding::Int32).unwrap().write(&id, start, 100.0, &samples).unwrap();
/// let trace = MiniSeedReader::new().load(&bytes).unwrap();
/// assert_eq!(trace.samples(), samples.as_slice());
/// assert_eq!(trace.id(), "XX.SYN..HHZ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MseedWriter {
    encoding: Encoding,
    record_length: usize,
}

impl MseedWriter {
    /// Writer for `encoding` with [`DEFAULT_RECORD_LENGTH`]-byte records.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] for encodings other than INT32 and FLOAT64.
    pub fn new(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Int32 | Encoding::Float64 => Ok(Self {
                encoding,
                record_length: DEFAULT_RECORD_LENGTH,
            }),
            other => Err(Error::format(format!("writing {other} records is not supported"))),
        }
    }

    /// Use records of `record_length` bytes (a power of two, 256 to 65536).
    pub fn with_record_length(mut self, record_length: usize) -> Result<Self> {
        if !record_length.is_power_of_two() || !(256..=65536).contains(&record_length) {
            return Err(Error::format(format!(
                "record length must be a power of two between 256 and 65536, got {record_length}"
            )));
        }
        self.record_length = record_length;
        Ok(self)
    }

    /// The data encoding in use.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encode `samples` starting at `start_time`.
    ///
    /// INT32 output rounds each sample to the nearest integer.
    pub fn write(
        &self,
        source_id: &SourceId,
        start_time: DateTime<Utc>,
        sampling_rate_hz: f64,
        samples: &[f64],
    ) -> Result<Vec<u8>> {
        if samples.is_empty() {
            return Err(Error::format("cannot write a trace without samples"));
        }
        let (factor, multiplier, exact) = rate_factors(sampling_rate_hz)?;

        let blockettes_len = FIXED_HEADER_LEN
            + BLOCKETTE_1000_LEN
            + if exact { 0 } else { BLOCKETTE_100_LEN };
        let data_offset = blockettes_len.div_ceil(DATA_ALIGNMENT) * DATA_ALIGNMENT;
        let sample_size = self.encoding.sample_size().unwrap_or(8);
        let per_record = (self.record_length - data_offset) / sample_size;

        let mut out = Vec::with_capacity(samples.len().div_ceil(per_record) * self.record_length);
        for (index, chunk) in samples.chunks(per_record).enumerate() {
            let offset_secs = (index * per_record) as f64 / sampling_rate_hz;
            let record_start = start_time + Duration::nanoseconds((offset_secs * 1e9).round() as i64);
            let sequence = (index as u32 % MAX_SEQUENCE) + 1;

            let mut record = vec![0u8; self.record_length];
            write_fixed_header(
                &mut record,
                sequence,
                source_id,
                record_start,
                chunk.len(),
                (factor, multiplier),
                data_offset,
                if exact { 1 } else { 2 },
            )?;

            let exponent = self.record_length.trailing_zeros() as u8;
            let b1000 = FIXED_HEADER_LEN;
            let next = if exact { 0 } else { b1000 + BLOCKETTE_1000_LEN };
            record[b1000..b1000 + 2].copy_from_slice(&1000u16.to_be_bytes());
            record[b1000 + 2..b1000 + 4].copy_from_slice(&(next as u16).to_be_bytes());
            record[b1000 + 4] = self.encoding.code();
            record[b1000 + 5] = 1;
            record[b1000 + 6] = exponent;
            if !exact {
                let b100 = next;
                record[b100..b100 + 2].copy_from_slice(&100u16.to_be_bytes());
                record[b100 + 4..b100 + 8]
                    .copy_from_slice(&(sampling_rate_hz as f32).to_be_bytes());
            }

            let data = &mut record[data_offset..];
            match self.encoding {
                Encoding::Int32 => {
                    for (dst, &s) in data.chunks_exact_mut(4).zip(chunk) {
                        dst.copy_from_slice(&(s.round() as i32).to_be_bytes());
                    }
                }
                _ => {
                    for (dst, &s) in data.chunks_exact_mut(8).zip(chunk) {
                        dst.copy_from_slice(&s.to_be_bytes());
                    }
                }
            }
            out.extend_from_slice(&record);
        }

        debug!(
            id = %source_id,
            records = out.len() / self.record_length,
            samples = samples.len(),
            encoding = %self.encoding,
            "wrote miniSEED"
        );
        Ok(out)
    }
}

#[allow(clippy::too_many_arguments)]
fn write_fixed_header(
    record: &mut [u8],
    sequence: u32,
    source_id: &SourceId,
    start: DateTime<Utc>,
    num_samples: usize,
    (factor, multiplier): (i16, i16),
    data_offset: usize,
    num_blockettes: u8,
) -> Result<()> {
    record[0..6].copy_from_slice(format!("{sequence:06}").as_bytes());
    record[6] = b'D';
    record[7] = b' ';

    let mut offset = 8;
    for (width, value) in source_id.header_fields() {
        if value.len() > width || !value.is_ascii() {
            return Err(Error::format(format!(
                "source id field '{value}' does not fit {width} ASCII characters"
            )));
        }
        let field = &mut record[offset..offset + width];
        field.fill(b' ');
        field[..value.len()].copy_from_slice(value.as_bytes());
        offset += width;
    }

    let year = u16::try_from(start.year())
        .map_err(|_| Error::format(format!("year {} cannot be encoded", start.year())))?;
    record[20..22].copy_from_slice(&year.to_be_bytes());
    record[22..24].copy_from_slice(&(start.ordinal() as u16).to_be_bytes());
    record[24] = start.hour() as u8;
    record[25] = start.minute() as u8;
    record[26] = start.second() as u8;
    let fraction = (start.nanosecond() / 100_000).min(9999) as u16;
    record[28..30].copy_from_slice(&fraction.to_be_bytes());

    record[30..32].copy_from_slice(&(num_samples as u16).to_be_bytes());
    record[32..34].copy_from_slice(&factor.to_be_bytes());
    record[34..36].copy_from_slice(&multiplier.to_be_bytes());
    record[39] = num_blockettes;
    record[44..46].copy_from_slice(&(data_offset as u16).to_be_bytes());
    record[46..48].copy_from_slice(&(FIXED_HEADER_LEN as u16).to_be_bytes());
    Ok(())
}

/// Express `rate` as a SEED factor/multiplier pair.
///
/// Returns `(factor, multiplier, exact)`; when the pair only approximates the
/// rate, the caller adds blockette 100 with the exact value.
fn rate_factors(rate: f64) -> Result<(i16, i16, bool)> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::format(format!(
            "sampling rate must be positive and finite, got {rate}"
        )));
    }
    let limit = f64::from(i16::MAX);
    if rate.fract() == 0.0 && rate <= limit {
        return Ok((rate as i16, 1, true));
    }
    let period = 1.0 / rate;
    if period.fract() == 0.0 && period <= limit {
        return Ok((-(period as i16), 1, true));
    }

    // Best rational approximation p / q with both terms in i16 range.
    let mut best: Option<(i16, i16, f64)> = None;
    for q in 1..=i16::MAX {
        let p = (rate * f64::from(q)).round();
        if p < 1.0 || p > limit {
            continue;
        }
        let error = (p / f64::from(q) - rate).abs();
        if best.is_none_or(|(_, _, e)| error < e) {
            best = Some((p as i16, q, error));
        }
        if error == 0.0 {
            break;
        }
    }
    let (p, q, error) =
        best.ok_or_else(|| Error::format(format!("sampling rate {rate} Hz cannot be encoded")))?;
    Ok((p, -q, error <= 1e-12 * rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miniseed::{nominal_rate, parse_records};
    use chrono::TimeZone;

    fn id() -> SourceId {
        "XX.SYN.00.HHZ".parse().unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap()
    }

    #[test]
    fn rate_factor_encodings() {
        assert_eq!(rate_factors(100.0).unwrap(), (100, 1, true));
        assert_eq!(rate_factors(0.1).unwrap(), (-10, 1, true));
        let (f, m, exact) = rate_factors(2.5).unwrap();
        assert!(exact);
        assert_eq!(nominal_rate(f, m), 2.5);
        let (f, m, _) = rate_factors(std::f64::consts::PI).unwrap();
        assert!((nominal_rate(f, m) - std::f64::consts::PI).abs() < 1e-6);
        assert!(rate_factors(0.0).is_err());
        assert!(rate_factors(f64::NAN).is_err());
    }

    #[test]
    fn int32_records_split_at_capacity() {
        let samples: Vec<f64> = (0..250).map(|i| f64::from(i) * 1.4).collect();
        let bytes = MseedWriter::new(Encoding::Int32)
            .unwrap()
            .write(&id(), start(), 50.0, &samples)
            .unwrap();
        // (512 - 64) / 4 = 112 samples per record
        assert_eq!(bytes.len(), 3 * 512);

        let records = parse_records(&bytes).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].header.num_samples, 112);
        assert_eq!(records[2].header.num_samples, 26);
        assert_eq!(records[1].header.sequence_number, 2);
        assert_eq!(records[0].samples[3], (3.0_f64 * 1.4).round());
        // Second record starts 112 / 50 = 2.24 s later, across the year boundary.
        assert_eq!(
            records[1].header.start_time,
            start() + Duration::milliseconds(2240)
        );
    }

    #[test]
    fn float64_preserves_values_and_odd_rates() {
        let samples = vec![0.125, -3.5e-7, 1.0e12];
        let bytes = MseedWriter::new(Encoding::Float64)
            .unwrap()
            .with_record_length(256)
            .unwrap()
            .write(&id(), start(), 19.98, &samples)
            .unwrap();
        let records = parse_records(&bytes).unwrap();
        assert_eq!(records[0].samples, samples);
        assert_eq!(records[0].header.encoding, Some(Encoding::Float64));
        assert!((records[0].header.sampling_rate_hz - 19.98).abs() < 1e-5);
    }

    #[test]
    fn unsupported_configurations() {
        assert!(MseedWriter::new(Encoding::Steim2).is_err());
        let writer = MseedWriter::new(Encoding::Int32).unwrap();
        assert!(writer.with_record_length(300).is_err());
        assert!(writer.write(&id(), start(), 10.0, &[]).is_err());
    }
}
