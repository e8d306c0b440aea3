//! Canonical Huffman decoding (RFC 1951 §3.2.2)

use crate::bits::BitCursor;
use crate::error::{InflateError, InflateResult};

/// Longest code DEFLATE allows
pub const MAX_BITS: usize = 15;

/// Decode table for one canonical code.
///
/// Instead of a pointer tree, the code is stored as the number of codes of
/// each length plus the symbols sorted by (length, symbol value). Within a
/// length class canonical codes are consecutive, so walking the lengths in
/// order while accumulating one bit at a time finds the symbol with no
/// per-node allocation.
#[derive(Debug, Clone)]
pub struct Huffman {
    counts: [u16; MAX_BITS + 1],
    symbols: Vec<u16>,
}

impl Huffman {
    /// Build from per-symbol code lengths (0 = unused symbol).
    ///
    /// Oversubscribed tables are rejected. Incomplete tables are accepted;
    /// a bit sequence that lands in the unassigned space fails at decode time.
    pub fn new(lengths: &[u8]) -> InflateResult<Self> {
        if lengths.iter().any(|&len| len as usize > MAX_BITS) {
            return Err(InflateError::InvalidCodeLengths("code length exceeds 15"));
        }
        let table = Self::build(lengths);

        let mut left: i32 = 1;
        for &count in &table.counts[1..] {
            left = (left << 1) - count as i32;
            if left < 0 {
                return Err(InflateError::InvalidCodeLengths("oversubscribed code"));
            }
        }
        Ok(table)
    }

    /// Build without the Kraft check; every length must be at most [`MAX_BITS`]
    pub(crate) fn build(lengths: &[u8]) -> Self {
        let mut counts = [0u16; MAX_BITS + 1];
        for &len in lengths {
            counts[len as usize] += 1;
        }

        let mut offsets = [0u16; MAX_BITS + 2];
        for len in 1..=MAX_BITS {
            offsets[len + 1] = offsets[len] + counts[len];
        }
        let mut symbols = vec![0u16; offsets[MAX_BITS + 1] as usize];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len != 0 {
                let slot = &mut offsets[len as usize];
                symbols[*slot as usize] = symbol as u16;
                *slot += 1;
            }
        }

        Self { counts, symbols }
    }

    /// True when every bit sequence up to the longest length reaches a symbol
    pub fn is_complete(&self) -> bool {
        let mut left: i32 = 1;
        for &count in &self.counts[1..] {
            left = (left << 1) - count as i32;
        }
        left == 0
    }

    /// Decode one symbol, reading the code MSB-first one bit at a time
    pub fn decode(&self, bits: &mut BitCursor<'_>) -> InflateResult<u16> {
        // `code` is the bits read so far, `first` the first canonical code of
        // the current length, `index` the offset of that length in `symbols`.
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for &count in &self.counts[1..] {
            code |= bits.read_bit()? as i32;
            let count = count as i32;
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(InflateError::InvalidSymbol)
    }
}
