//! DEFLATE decompression (RFC 1951)
//!
//! Decodes a raw DEFLATE stream (no zlib or gzip wrapper), as found in
//! ZIP entries with compression method 8.

use crate::bits::BitCursor;
use crate::error::{InflateError, InflateResult};
use crate::huffman::Huffman;
use log::trace;
use once_cell::sync::Lazy;

/// Length code base values (codes 257-285)
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for length codes
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance code base values (codes 0-29)
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance codes
const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length code lengths
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Upper bound on the DEFLATE expansion ratio, used to cap preallocation
const MAX_RATIO: usize = 1032;

/// Fixed literal/length code (RFC 1951 §3.2.6)
static FIXED_LITERAL: Lazy<Huffman> = Lazy::new(|| {
    let mut lengths = [0u8; 288];
    lengths[..144].fill(8);
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths[280..].fill(8);
    Huffman::build(&lengths)
});

/// Fixed distance code: 32 five-bit codes, of which 30 and 31 never occur
static FIXED_DISTANCE: Lazy<Huffman> = Lazy::new(|| Huffman::build(&[5u8; 32]));

/// Inflate a raw DEFLATE stream.
///
/// `expected_size`, when known, sizes the output buffer up front and bounds
/// it: a stream that would produce more bytes fails with
/// [`InflateError::OutputTooLarge`]. Producing fewer bytes is not an error
/// here; callers holding a declared size compare it against the result.
///
/// ```
/// use fortisku_zip::inflate;
///
/// // A single final stored block holding "hi"
/// let out = inflate(&[0x01, 0x02, 0x00, 0xFD, 0xFF, b'h', b'i'], Some(2)).unwrap();
/// assert_eq!(out, b"hi");
/// ```
pub fn inflate(data: &[u8], expected_size: Option<usize>) -> InflateResult<Vec<u8>> {
    let mut bits = BitCursor::new(data);
    let mut out = Output::new(data.len(), expected_size);

    loop {
        let last = bits.read_bit()? == 1;
        let block_type = bits.read_bits(2)?;
        trace!(
            "deflate block type {} at byte {} (final: {})",
            block_type,
            bits.position(),
            last
        );

        match block_type {
            0 => inflate_stored(&mut bits, &mut out)?,
            1 => inflate_codes(&mut bits, &mut out, &FIXED_LITERAL, &FIXED_DISTANCE)?,
            2 => {
                let (literal, distance) = read_dynamic_tables(&mut bits)?;
                inflate_codes(&mut bits, &mut out, &literal, &distance)?;
            }
            _ => return Err(InflateError::ReservedBlockType),
        }

        if last {
            break;
        }
    }

    Ok(out.buf)
}

/// Output buffer with an optional hard limit
struct Output {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl Output {
    fn new(input_len: usize, limit: Option<usize>) -> Self {
        let capacity = match limit {
            Some(limit) => limit.min(input_len.saturating_mul(MAX_RATIO)),
            None => input_len.saturating_mul(4),
        };
        Self {
            buf: Vec::with_capacity(capacity),
            limit,
        }
    }

    fn reserve(&self, extra: usize) -> InflateResult<()> {
        match self.limit {
            Some(limit) if self.buf.len() + extra > limit => {
                Err(InflateError::OutputTooLarge(limit))
            }
            _ => Ok(()),
        }
    }

    #[inline]
    fn push(&mut self, byte: u8) -> InflateResult<()> {
        self.reserve(1)?;
        self.buf.push(byte);
        Ok(())
    }

    fn extend(&mut self, bytes: &[u8]) -> InflateResult<()> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// LZ77 copy, one byte at a time so an overlapping source repeats
    fn copy_back(&mut self, distance: usize, length: usize) -> InflateResult<()> {
        if distance > self.buf.len() {
            return Err(InflateError::DistanceTooFar {
                distance,
                available: self.buf.len(),
            });
        }
        self.reserve(length)?;
        let start = self.buf.len() - distance;
        for i in 0..length {
            let byte = self.buf[start + i];
            self.buf.push(byte);
        }
        Ok(())
    }
}

/// Stored block: align, LEN, NLEN, then LEN literal bytes
fn inflate_stored(bits: &mut BitCursor<'_>, out: &mut Output) -> InflateResult<()> {
    bits.align_to_byte();
    let len = bits.read_bits(16)? as u16;
    let nlen = bits.read_bits(16)? as u16;
    if len != !nlen {
        return Err(InflateError::StoredLengthMismatch { len, nlen });
    }
    let bytes = bits.read_aligned_bytes(len as usize)?;
    out.extend(bytes)
}

/// Read the code-length code and the literal/length and distance tables of a dynamic block
fn read_dynamic_tables(bits: &mut BitCursor<'_>) -> InflateResult<(Huffman, Huffman)> {
    let hlit = bits.read_bits(5)? as usize + 257;
    let hdist = bits.read_bits(5)? as usize + 1;
    let hclen = bits.read_bits(4)? as usize + 4;
    if hlit > 286 || hdist > 30 {
        return Err(InflateError::InvalidCodeLengths("too many length or distance codes"));
    }

    let mut code_length_lengths = [0u8; 19];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        code_length_lengths[symbol] = bits.read_bits(3)? as u8;
    }
    let code_lengths = Huffman::new(&code_length_lengths)?;
    if !code_lengths.is_complete() {
        return Err(InflateError::InvalidCodeLengths("incomplete code-length code"));
    }

    let mut lengths = vec![0u8; hlit + hdist];
    let mut i = 0;
    while i < lengths.len() {
        let symbol = code_lengths.decode(bits)?;
        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                let previous = match i.checked_sub(1) {
                    Some(prev) => lengths[prev],
                    None => {
                        return Err(InflateError::InvalidCodeLengths(
                            "repeat with no previous length",
                        ))
                    }
                };
                (previous, 3 + bits.read_bits(2)? as usize)
            }
            17 => (0, 3 + bits.read_bits(3)? as usize),
            18 => (0, 11 + bits.read_bits(7)? as usize),
            _ => return Err(InflateError::InvalidSymbol),
        };
        if i + repeat > lengths.len() {
            return Err(InflateError::InvalidCodeLengths("too many code lengths"));
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    if lengths[256] == 0 {
        return Err(InflateError::InvalidCodeLengths("missing end-of-block code"));
    }

    let literal = Huffman::new(&lengths[..hlit])?;
    let distance = Huffman::new(&lengths[hlit..])?;
    Ok((literal, distance))
}

/// Decode literal/length and distance symbols until end-of-block
fn inflate_codes(
    bits: &mut BitCursor<'_>,
    out: &mut Output,
    literal: &Huffman,
    distance: &Huffman,
) -> InflateResult<()> {
    loop {
        let symbol = literal.decode(bits)?;
        match symbol {
            0..=255 => out.push(symbol as u8)?,
            256 => return Ok(()),
            257..=285 => {
                let index = (symbol - 257) as usize;
                let length =
                    LENGTH_BASE[index] as usize + bits.read_bits(LENGTH_EXTRA[index])? as usize;

                let index = distance.decode(bits)? as usize;
                if index >= DISTANCE_BASE.len() {
                    return Err(InflateError::InvalidSymbol);
                }
                let dist =
                    DISTANCE_BASE[index] as usize + bits.read_bits(DISTANCE_EXTRA[index])? as usize;

                out.copy_back(dist, length)?;
            }
            _ => return Err(InflateError::InvalidSymbol),
        }
    }
}
