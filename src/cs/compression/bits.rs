//! MSB-first bit sink and bit source.
//!
//! Every container in this crate is a densely packed bit stream where the first
//! bit written lands in the most significant bit of the first byte. The final
//! byte is padded with zero bits; readers never interpret the pad on their own,
//! each codec decides when to stop.

use crate::error::{Error, Result};
use bitvec::prelude::*;

/// Append-only bit buffer that materializes to bytes.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Appends a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends the low `count` bits of `value`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `count` is greater than 64.
    pub fn push_bits(&mut self, value: u64, count: usize) {
        assert!(count <= 64, "cannot push more than 64 bits at once");
        for shift in (0..count).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Appends a whole byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.push_bits(u64::from(byte), 8);
    }

    /// Appends whole bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bits.extend_from_bitslice(bytes.view_bits::<Msb0>());
    }

    /// Appends an arbitrary run of bits.
    pub fn push_slice(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether no bits have been written.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Consumes the writer, zero-padding the last byte.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bits.set_uninitialized(false);
        self.bits.into_vec()
    }
}

/// Positional MSB-first reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bits: bytes.view_bits::<Msb0>(),
            pos: 0,
        }
    }

    /// Current bit position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bits, pad bits included.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Reads one bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        let bit = *self
            .bits
            .get(self.pos)
            .ok_or_else(|| Error::decode_at("unexpected end of bit stream", self.pos))?;
        self.pos += 1;
        Ok(bit)
    }

    /// Reads `count` bits (at most 64) as a big-endian unsigned integer.
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(Error::decode(format!(
                "cannot read {count} bits into a 64-bit value"
            )));
        }
        let value = self
            .read_slice(count)?
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit));
        Ok(value)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        // Eight bits always fit in a u8.
        Ok(self.read_bits(8)? as u8)
    }

    /// Borrows the next `count` bits and advances past them.
    pub fn read_slice(&mut self, count: usize) -> Result<&'a BitSlice<u8, Msb0>> {
        if count > self.remaining() {
            return Err(Error::decode_at(
                format!(
                    "need {count} bits but only {} remain",
                    self.remaining()
                ),
                self.pos,
            ));
        }
        let bits = self.bits;
        let slice = &bits[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Skips forward to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.pos = (self.pos + 7) / 8 * 8;
        self.pos = self.pos.min(self.bits.len());
    }
}
