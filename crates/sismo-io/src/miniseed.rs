//! miniSEED 2.x data record parsing and trace assembly.
//!
//! A miniSEED file is a sequence of fixed-length records. Each record starts
//! with a 48-byte fixed header followed by a chain of blockettes and the
//! encoded samples:
//!
//! ```text
//! offset  size  field
//!  0       6    sequence number (ASCII)
//!  6       1    data quality indicator (D, R, Q or M)
//!  8       5    station
//! 13       2    location
//! 15       3    channel
//! 18       2    network
//! 20      10    record start time (BTIME)
//! 30       2    number of samples
//! 32       2    sample rate factor
//! 34       2    sample rate multiplier
//! 36       1    activity flags
//! 39       1    number of blockettes
//! 40       4    time correction (0.0001 s)
//! 44       2    offset of first data byte
//! 46       2    offset of first blockette
//! ```
//!
//! Blockette 1000 carries the data encoding, word order and record length;
//! blockette 100 an exact sample rate; blockette 1001 a microsecond offset.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use sismo_core::Trace;

use crate::steim;
use crate::{Error, Result};

/// Length of the fixed section of the data header.
pub(crate) const FIXED_HEADER_LEN: usize = 48;

/// Smallest and largest record lengths accepted, as powers of two.
const MIN_RECORD_EXPONENT: u8 = 7;
const MAX_RECORD_EXPONENT: u8 = 16;

/// Activity flag bit: time correction already applied to the start time.
const TIME_CORRECTION_APPLIED: u8 = 0x02;

/// Field widths of a source identifier inside the fixed header.
const NETWORK_LEN: usize = 2;
const STATION_LEN: usize = 5;
const LOCATION_LEN: usize = 2;
const CHANNEL_LEN: usize = 3;

/// Byte order of multi-byte header fields or sample words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first (the SEED default).
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

macro_rules! read_as {
    ($name:ident, $ty:ty, $n:literal) => {
        pub(crate) fn $name(self, bytes: [u8; $n]) -> $ty {
            match self {
                ByteOrder::BigEndian => <$ty>::from_be_bytes(bytes),
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(bytes),
            }
        }
    };
}

impl ByteOrder {
    read_as!(u16, u16, 2);
    read_as!(i16, i16, 2);
    read_as!(u32, u32, 4);
    read_as!(i32, i32, 4);
    read_as!(f32, f32, 4);
    read_as!(f64, f64, 8);
}

/// Copy `N` bytes starting at `offset`, failing on a short buffer.
pub(crate) fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    buf.get(offset..offset + N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or_else(|| {
            Error::format(format!(
                "truncated record: need {N} bytes at offset {offset}, have {}",
                buf.len()
            ))
        })
}

/// Data encoding declared in blockette 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Free-form text; carries no samples.
    Ascii,
    /// 16-bit signed integers.
    Int16,
    /// 32-bit signed integers.
    Int32,
    /// IEEE 754 single precision.
    Float32,
    /// IEEE 754 double precision.
    Float64,
    /// Steim-1 compressed differences.
    Steim1,
    /// Steim-2 compressed differences.
    Steim2,
}

impl Encoding {
    /// Decode the SEED encoding code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Ascii),
            1 => Ok(Self::Int16),
            3 => Ok(Self::Int32),
            4 => Ok(Self::Float32),
            5 => Ok(Self::Float64),
            10 => Ok(Self::Steim1),
            11 => Ok(Self::Steim2),
            other => Err(Error::format(format!("unsupported data encoding {other}"))),
        }
    }

    /// SEED encoding code.
    pub fn code(self) -> u8 {
        match self {
            Self::Ascii => 0,
            Self::Int16 => 1,
            Self::Int32 => 3,
            Self::Float32 => 4,
            Self::Float64 => 5,
            Self::Steim1 => 10,
            Self::Steim2 => 11,
        }
    }

    /// Bytes per sample for uncompressed encodings.
    pub fn sample_size(self) -> Option<usize> {
        match self {
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::Float64 => Some(8),
            Self::Ascii | Self::Steim1 | Self::Steim2 => None,
        }
    }

    /// Conventional upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::Steim1 => "STEIM1",
            Self::Steim2 => "STEIM2",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `NET.STA.LOC.CHA` source identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceId {
    /// Network code (up to 2 characters).
    pub network: String,
    /// Station code (up to 5 characters).
    pub station: String,
    /// Location code (up to 2 characters, often empty).
    pub location: String,
    /// Channel code (up to 3 characters).
    pub channel: String,
}

impl SourceId {
    /// Fixed-width, space-padded header fields in header order
    /// (station, location, channel, network).
    pub(crate) fn header_fields(&self) -> [(usize, &str); 4] {
        [
            (STATION_LEN, self.station.as_str()),
            (LOCATION_LEN, self.location.as_str()),
            (CHANNEL_LEN, self.channel.as_str()),
            (NETWORK_LEN, self.network.as_str()),
        ]
    }

    fn from_header(buf: &[u8]) -> Self {
        let field = |range: std::ops::Range<usize>| {
            String::from_utf8_lossy(&buf[range])
                .trim_matches(|c: char| c == ' ' || c == '\0')
                .to_string()
        };
        Self {
            station: field(8..13),
            location: field(13..15),
            channel: field(15..18),
            network: field(18..20),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let [network, station, location, channel] = parts.as_slice() else {
            return Err(Error::format(format!(
                "source id must look like NET.STA.LOC.CHA, got '{s}'"
            )));
        };
        for (name, value, width) in [
            ("network", network, NETWORK_LEN),
            ("station", station, STATION_LEN),
            ("location", location, LOCATION_LEN),
            ("channel", channel, CHANNEL_LEN),
        ] {
            if value.len() > width || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::format(format!(
                    "{name} code '{value}' must be at most {width} ASCII letters or digits"
                )));
            }
        }
        Ok(Self {
            network: (*network).to_string(),
            station: (*station).to_string(),
            location: (*location).to_string(),
            channel: (*channel).to_string(),
        })
    }
}

/// Decoded data header of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordHeader {
    /// Sequence number from the first six bytes (0 when not numeric).
    pub sequence_number: u32,
    /// Data quality indicator.
    pub quality: char,
    /// Source identifier.
    pub source_id: SourceId,
    /// Time of the first sample, corrections applied.
    pub start_time: DateTime<Utc>,
    /// Declared number of samples.
    pub num_samples: usize,
    /// Sampling rate in Hz (blockette 100 overrides the nominal rate).
    pub sampling_rate_hz: f64,
    /// Data encoding, if blockette 1000 is present.
    pub encoding: Option<Encoding>,
    /// Byte order of the header fields.
    pub header_byte_order: ByteOrder,
    /// Byte order of the sample words.
    pub data_byte_order: ByteOrder,
    /// Record length, if blockette 1000 is present.
    pub record_length: Option<usize>,
    /// Offset of the first data byte from the record start.
    pub data_offset: usize,
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Header fields.
    pub header: RecordHeader,
    /// Decoded samples (empty for text and zero-sample records).
    pub samples: Vec<f64>,
}

fn plausible_btime(order: ByteOrder, buf: &[u8]) -> bool {
    let year = order.u16([buf[20], buf[21]]);
    let day = order.u16([buf[22], buf[23]]);
    (1900..=2100).contains(&year) && (1..=366).contains(&day)
}

/// Nominal sampling rate from the header factor and multiplier.
pub(crate) fn nominal_rate(factor: i16, multiplier: i16) -> f64 {
    let f = f64::from(factor);
    let m = f64::from(multiplier);
    if factor == 0 || multiplier == 0 {
        0.0
    } else if factor > 0 && multiplier > 0 {
        f * m
    } else if factor > 0 {
        f / -m
    } else if multiplier > 0 {
        m / -f
    } else {
        1.0 / (f * m)
    }
}

fn btime(order: ByteOrder, buf: &[u8]) -> Result<DateTime<Utc>> {
    let year = order.u16([buf[20], buf[21]]);
    let day = order.u16([buf[22], buf[23]]);
    let (hour, minute, second) = (buf[24], buf[25], buf[26]);
    let fraction = order.u16([buf[28], buf[29]]);

    if hour > 23 || minute > 59 || second > 60 || fraction > 9999 {
        return Err(Error::format(format!(
            "invalid record start time {hour:02}:{minute:02}:{second:02}.{fraction:04}"
        )));
    }
    let midnight = NaiveDate::from_yo_opt(i32::from(year), u32::from(day))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::format(format!("invalid record date {year}-{day:03}")))?;

    // Seconds are added as a duration so that a leap second (60) rolls over.
    let offset = Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second))
        + Duration::microseconds(i64::from(fraction) * 100);
    Ok(midnight.and_utc() + offset)
}

/// Parse the fixed header and blockette chain at the start of `buf`.
pub(crate) fn parse_header(buf: &[u8]) -> Result<RecordHeader> {
    if buf.len() < FIXED_HEADER_LEN {
        return Err(Error::format(format!(
            "{} bytes is too short for a miniSEED header",
            buf.len()
        )));
    }
    let quality = char::from(buf[6]);
    if !matches!(quality, 'D' | 'R' | 'Q' | 'M') {
        return Err(Error::format(format!(
            "not a miniSEED data record (quality indicator {:#04x})",
            buf[6]
        )));
    }

    let order = if plausible_btime(ByteOrder::BigEndian, buf) {
        ByteOrder::BigEndian
    } else if plausible_btime(ByteOrder::LittleEndian, buf) {
        ByteOrder::LittleEndian
    } else {
        return Err(Error::format("record start time is not plausible in either byte order"));
    };

    let sequence_number = std::str::from_utf8(&buf[0..6])
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let mut start_time = btime(order, buf)?;
    let num_samples = usize::from(order.u16(take(buf, 30)?));
    let mut sampling_rate_hz = nominal_rate(order.i16(take(buf, 32)?), order.i16(take(buf, 34)?));
    let activity_flags = buf[36];
    let num_blockettes = buf[39];
    let time_correction = order.i32(take(buf, 40)?);
    let data_offset = usize::from(order.u16(take(buf, 44)?));
    let mut blockette_offset = usize::from(order.u16(take(buf, 46)?));

    let mut encoding = None;
    let mut data_byte_order = order;
    let mut record_length = None;

    for _ in 0..num_blockettes {
        if blockette_offset == 0 {
            break;
        }
        if blockette_offset < FIXED_HEADER_LEN {
            return Err(Error::format(format!(
                "blockette offset {blockette_offset} points into the fixed header"
            )));
        }
        let kind = order.u16(take(buf, blockette_offset)?);
        let next = usize::from(order.u16(take(buf, blockette_offset + 2)?));
        match kind {
            1000 => {
                let [code, word_order, exponent, _] = take::<4>(buf, blockette_offset + 4)?;
                encoding = Some(Encoding::from_code(code)?);
                data_byte_order = if word_order == 0 {
                    ByteOrder::LittleEndian
                } else {
                    ByteOrder::BigEndian
                };
                if !(MIN_RECORD_EXPONENT..=MAX_RECORD_EXPONENT).contains(&exponent) {
                    return Err(Error::format(format!(
                        "record length 2^{exponent} is out of range"
                    )));
                }
                record_length = Some(1usize << exponent);
            }
            100 => {
                let rate = f64::from(order.f32(take(buf, blockette_offset + 4)?));
                if rate.is_finite() && rate > 0.0 {
                    sampling_rate_hz = rate;
                }
            }
            1001 => {
                let [_, microseconds] = take::<2>(buf, blockette_offset + 4)?;
                start_time += Duration::microseconds(i64::from(microseconds as i8));
            }
            other => trace!(blockette = other, "skipping blockette"),
        }
        if next != 0 && next <= blockette_offset {
            return Err(Error::format("blockette chain does not advance"));
        }
        blockette_offset = next;
    }

    if activity_flags & TIME_CORRECTION_APPLIED == 0 && time_correction != 0 {
        start_time += Duration::microseconds(i64::from(time_correction) * 100);
    }

    Ok(RecordHeader {
        sequence_number,
        quality,
        source_id: SourceId::from_header(buf),
        start_time,
        num_samples,
        sampling_rate_hz,
        encoding,
        header_byte_order: order,
        data_byte_order,
        record_length,
        data_offset,
    })
}

/// Find the record length of a record without blockette 1000 by looking for
/// the next header at each power of two.
fn probe_record_length(buf: &[u8]) -> Result<usize> {
    for exponent in MIN_RECORD_EXPONENT..=MAX_RECORD_EXPONENT {
        let len = 1usize << exponent;
        if len == buf.len() {
            return Ok(len);
        }
        if len < buf.len() && parse_header(&buf[len..]).is_ok() {
            return Ok(len);
        }
        if len > buf.len() {
            break;
        }
    }
    Err(Error::format("cannot determine record length (no blockette 1000)"))
}

fn decode_fixed(
    data: &[u8],
    count: usize,
    size: usize,
    convert: impl Fn(&[u8]) -> f64,
) -> Result<Vec<f64>> {
    let needed = count * size;
    if data.len() < needed {
        return Err(Error::format(format!(
            "record declares {count} samples ({needed} bytes) but holds {} data bytes",
            data.len()
        )));
    }
    Ok(data[..needed].chunks_exact(size).map(convert).collect())
}

fn decode_samples(header: &RecordHeader, record: &[u8]) -> Result<Vec<f64>> {
    let count = header.num_samples;
    if count == 0 {
        return Ok(Vec::new());
    }
    let encoding = header.encoding.ok_or_else(|| {
        Error::format(format!(
            "record {} has samples but no blockette 1000 to declare their encoding",
            header.sequence_number
        ))
    })?;
    if header.data_offset < FIXED_HEADER_LEN || header.data_offset > record.len() {
        return Err(Error::format(format!(
            "data offset {} is outside the {}-byte record",
            header.data_offset,
            record.len()
        )));
    }
    let data = &record[header.data_offset..];
    let order = header.data_byte_order;

    match encoding {
        Encoding::Ascii => {
            debug!(sequence = header.sequence_number, "skipping text record");
            Ok(Vec::new())
        }
        Encoding::Int16 => decode_fixed(data, count, 2, |b| f64::from(order.i16([b[0], b[1]]))),
        Encoding::Int32 => decode_fixed(data, count, 4, |b| {
            f64::from(order.i32([b[0], b[1], b[2], b[3]]))
        }),
        Encoding::Float32 => decode_fixed(data, count, 4, |b| {
            f64::from(order.f32([b[0], b[1], b[2], b[3]]))
        }),
        Encoding::Float64 => decode_fixed(data, count, 8, |b| {
            order.f64([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }),
        Encoding::Steim1 => Ok(steim::decode_steim1(data, count, order)?
            .into_iter()
            .map(f64::from)
            .collect()),
        Encoding::Steim2 => Ok(steim::decode_steim2(data, count, order)?
            .into_iter()
            .map(f64::from)
            .collect()),
    }
}

/// Decode every record in `bytes`, in file order.
///
/// # Errors
///
/// [`Error::Format`] for empty input, a header that does not parse, an
/// unsupported encoding, or a record that is truncated.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>> {
    if bytes.is_empty() {
        return Err(Error::format("input is empty"));
    }

    let mut records = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let header = parse_header(rest).map_err(|e| match e {
            Error::Format(reason) => Error::format(format!("record at byte {offset}: {reason}")),
            other => other,
        })?;
        let len = match header.record_length {
            Some(len) => len,
            None => probe_record_length(rest)?,
        };
        let record = rest.get(..len).ok_or_else(|| {
            Error::format(format!(
                "record at byte {offset} declares {len} bytes, only {} remain",
                rest.len()
            ))
        })?;
        let samples = decode_samples(&header, record)?;
        trace!(
            sequence = header.sequence_number,
            id = %header.source_id,
            samples = samples.len(),
            "decoded record"
        );
        records.push(Record { header, samples });
        offset += len;
    }
    debug!(records = records.len(), bytes = bytes.len(), "parsed miniSEED");
    Ok(records)
}

/// Contiguous samples from one source, merged from one or more records.
#[derive(Debug, Clone, PartialEq)]
pub struct MseedTrace {
    /// Source identifier.
    pub source_id: SourceId,
    /// Time of the first sample.
    pub start_time: DateTime<Utc>,
    /// Sampling rate in Hz.
    pub sampling_rate_hz: f64,
    /// Samples in time order.
    pub samples: Vec<f64>,
    /// Number of records merged into this trace.
    pub record_count: usize,
}

impl MseedTrace {
    /// Duration covered by the samples, `len / sampling_rate_hz`.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    /// Time of the last sample.
    pub fn end_time(&self) -> DateTime<Utc> {
        let last = self.samples.len().saturating_sub(1) as f64 / self.sampling_rate_hz;
        self.start_time + seconds(last)
    }

    /// Expected time of the sample after the last one.
    fn next_sample_time(&self) -> DateTime<Utc> {
        self.start_time + seconds(self.duration_secs())
    }

    /// Whether a record can be appended without a gap or overlap.
    fn accepts(&self, header: &RecordHeader) -> bool {
        if header.source_id != self.source_id {
            return false;
        }
        let rate = self.sampling_rate_hz;
        if (header.sampling_rate_hz - rate).abs() > 1e-4 * rate {
            return false;
        }
        let drift = (header.start_time - self.next_sample_time())
            .num_nanoseconds()
            .map_or(f64::INFINITY, |ns| ns as f64 * 1e-9);
        drift.abs() <= 0.5 / rate
    }

    /// Convert into a core [`Trace`] tagged with the source id.
    pub fn to_trace(&self) -> Result<Trace> {
        Ok(Trace::new(self.samples.clone(), self.sampling_rate_hz)?
            .with_id(self.source_id.to_string()))
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::nanoseconds((secs * 1e9).round() as i64)
}

/// Merge records into traces.
///
/// A record joins an existing trace when it has the same source id and
/// sampling rate and starts within half a sample of where that trace ends.
/// Otherwise it starts a new trace. Traces keep the order in which their
/// first record appears; records without samples are skipped.
pub fn assemble_traces(records: Vec<Record>) -> Vec<MseedTrace> {
    let mut traces: Vec<MseedTrace> = Vec::new();
    for Record { header, samples } in records {
        if samples.is_empty() {
            continue;
        }
        if header.sampling_rate_hz <= 0.0 {
            debug!(id = %header.source_id, "skipping record without a sampling rate");
            continue;
        }
        if let Some(existing) = traces.iter_mut().rev().find(|t| t.accepts(&header)) {
            existing.samples.extend(samples);
            existing.record_count += 1;
            continue;
        }
        traces.push(MseedTrace {
            source_id: header.source_id,
            start_time: header.start_time,
            sampling_rate_hz: header.sampling_rate_hz,
            samples,
            record_count: 1,
        });
    }
    traces
}
