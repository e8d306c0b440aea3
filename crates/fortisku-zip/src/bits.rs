//! LSB-first bit cursor for DEFLATE streams

use crate::error::{InflateError, InflateResult};

/// Reads bits from a byte slice, least significant bit of each byte first.
///
/// Between calls the accumulator holds fewer than 8 bits, all of them from
/// the byte most recently loaded, so aligning is just dropping them.
pub struct BitCursor<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u8,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
        }
    }

    /// Read `n` bits (at most 16); the first bit consumed is bit 0 of the result.
    #[inline]
    pub fn read_bits(&mut self, n: u8) -> InflateResult<u32> {
        debug_assert!(n <= 16);
        while self.bit_count < n {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or(InflateError::StreamExhausted)?;
            self.bit_buf |= (byte as u32) << self.bit_count;
            self.pos += 1;
            self.bit_count += 8;
        }
        let value = self.bit_buf & ((1u32 << n) - 1);
        self.bit_buf >>= n;
        self.bit_count -= n;
        Ok(value)
    }

    #[inline]
    pub fn read_bit(&mut self) -> InflateResult<u32> {
        self.read_bits(1)
    }

    /// Discard the rest of a partially consumed byte
    pub fn align_to_byte(&mut self) {
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    /// Take `len` raw bytes; only meaningful after [`align_to_byte`](Self::align_to_byte)
    pub fn read_aligned_bytes(&mut self, len: usize) -> InflateResult<&'a [u8]> {
        debug_assert_eq!(self.bit_count, 0);
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(InflateError::StreamExhausted)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Bytes consumed so far, counting a partially read byte
    pub fn position(&self) -> usize {
        self.pos
    }
}
