//! Steim-1 and Steim-2 difference decompression.
//!
//! Data is packed in 64-byte frames of sixteen 32-bit words. Word 0 of each
//! frame holds fifteen 2-bit control codes, one per following word. In the
//! first frame, words 1 and 2 are the forward (first sample) and reverse
//! (last sample) integration constants.
//!
//! The first difference of a record refers to the last sample of the
//! previous record, so it is skipped when integrating.

use tracing::warn;

use crate::miniseed::ByteOrder;
use crate::{Error, Result};

/// Bytes per Steim frame.
pub const FRAME_LEN: usize = 64;
const WORDS_PER_FRAME: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    One,
    Two,
}

/// Sign-extend the low `bits` bits of `value`.
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Push `count` packed differences of `bits` width, most significant first.
fn unpack(word: u32, count: u32, bits: u32, out: &mut Vec<i32>) {
    let mask = if bits == 32 { u32::MAX } else { (1 << bits) - 1 };
    for k in 0..count {
        let shift = bits * (count - 1 - k);
        out.push(sign_extend((word >> shift) & mask, bits));
    }
}

fn unpack_word(level: Level, code: u32, word: u32, out: &mut Vec<i32>) -> Result<()> {
    match (level, code) {
        (_, 0) => {}
        (_, 1) => unpack(word, 4, 8, out),
        (Level::One, 2) => unpack(word, 2, 16, out),
        (Level::One, 3) => unpack(word, 1, 32, out),
        (Level::Two, 2) => match word >> 30 {
            1 => unpack(word, 1, 30, out),
            2 => unpack(word, 2, 15, out),
            3 => unpack(word, 3, 10, out),
            dnib => {
                return Err(Error::format(format!(
                    "invalid Steim-2 sub-code {dnib} for control code 2"
                )));
            }
        },
        (Level::Two, 3) => match word >> 30 {
            0 => unpack(word, 5, 6, out),
            1 => unpack(word, 6, 5, out),
            2 => unpack(word, 7, 4, out),
            dnib => {
                return Err(Error::format(format!(
                    "invalid Steim-2 sub-code {dnib} for control code 3"
                )));
            }
        },
        (_, code) => unreachable!("2-bit control code {code}"),
    }
    Ok(())
}

fn decode(level: Level, data: &[u8], num_samples: usize, order: ByteOrder) -> Result<Vec<i32>> {
    let mut diffs: Vec<i32> = Vec::with_capacity(num_samples + 7);
    let mut constants = None;

    'frames: for frame in data.chunks_exact(FRAME_LEN) {
        let mut words = [0u32; WORDS_PER_FRAME];
        for (w, chunk) in words.iter_mut().zip(frame.chunks_exact(4)) {
            *w = order.u32([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let control = words[0];
        let first_data_word = if constants.is_none() {
            constants = Some((words[1] as i32, words[2] as i32));
            3
        } else {
            1
        };
        for (j, &word) in words.iter().enumerate().skip(first_data_word) {
            let code = (control >> (30 - 2 * j)) & 0b11;
            unpack_word(level, code, word, &mut diffs)?;
            if diffs.len() >= num_samples {
                break 'frames;
            }
        }
    }

    let (first, last) = constants.ok_or_else(|| Error::format("Steim data holds no frames"))?;
    if diffs.len() < num_samples {
        return Err(Error::format(format!(
            "Steim data holds {} differences, header declares {num_samples} samples",
            diffs.len()
        )));
    }

    let mut samples = Vec::with_capacity(num_samples);
    let mut acc = first;
    samples.push(acc);
    for &d in &diffs[1..num_samples] {
        acc = acc.wrapping_add(d);
        samples.push(acc);
    }
    if acc != last {
        warn!(
            decoded = acc,
            expected = last,
            "Steim reverse integration constant mismatch"
        );
    }
    Ok(samples)
}

/// Decode `num_samples` Steim-1 compressed samples.
pub fn decode_steim1(data: &[u8], num_samples: usize, order: ByteOrder) -> Result<Vec<i32>> {
    decode(Level::One, data, num_samples, order)
}

/// Decode `num_samples` Steim-2 compressed samples.
pub fn decode_steim2(data: &[u8], num_samples: usize, order: ByteOrder) -> Result<Vec<i32>> {
    decode(Level::Two, data, num_samples, order)
}
