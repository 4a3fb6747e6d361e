//! Dense bit-vector used as the per-shard bucket of [`ShardedBitset`].
//!
//! [`ShardedBitset`]: crate::ShardedBitset

use std::io::{self, Read, Write};

use bitvec::prelude::*;

use crate::codec::{read_u64, write_u64};

/// Largest bit length a single vector can address (one bit per `u32` value).
pub const MAX_BITS: u64 = 1 << 32;

/// Upper bound on words reserved up front while decoding, so a corrupt
/// header cannot force a large allocation before the data is seen.
const READ_RESERVE_WORDS: usize = 1024;

/// A growable bit array indexed by `u32`.
///
/// The vector grows to cover the highest index ever set and never shrinks,
/// so clearing bits leaves an all-zero tail behind.
///
/// Wire format: `[bit_len: u64 BE][ceil(bit_len / 64) × word: u64 BE]`. The
/// length prefix makes the encoding self-terminating, which the outer shard
/// framing relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenseBits {
    bits: BitVec<u64, Lsb0>,
}

impl DenseBits {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
        }
    }

    /// Set the bit at `index`, growing the vector if needed.
    pub fn set(&mut self, index: u32) {
        let index = index as usize;
        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }
        self.bits.set(index, true);
    }

    /// Clear the bit at `index`. Indices past the end are already clear.
    pub fn unset(&mut self, index: u32) {
        let index = index as usize;
        if index < self.bits.len() {
            self.bits.set(index, false);
        }
    }

    /// Test the bit at `index`.
    pub fn test(&self, index: u32) -> bool {
        self.bits.get(index as usize).is_some_and(|bit| *bit)
    }

    /// Number of set bits.
    pub fn count(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    /// Returns `true` if no bit is set.
    pub fn none(&self) -> bool {
        self.bits.not_any()
    }

    /// Number of addressable bits (highest set index + 1, at least).
    pub fn bit_len(&self) -> u64 {
        self.bits.len() as u64
    }

    /// Iterate over set indices in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = u32> + '_ {
        self.bits.iter_ones().map(|index| index as u32)
    }

    /// The number of bytes [`write_to`](Self::write_to) produces.
    pub fn serialized_size(&self) -> usize {
        8 + self.bits.as_raw_slice().len() * 8
    }

    /// Serialize to a writer, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<u64> {
        write_u64(&mut writer, self.bits.len() as u64)?;
        for word in self.bits.as_raw_slice() {
            write_u64(&mut writer, *word)?;
        }
        Ok(self.serialized_size() as u64)
    }

    /// Deserialize from a reader, consuming exactly the encoded bytes.
    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let bit_len = read_u64(&mut reader)?;
        if bit_len > MAX_BITS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("dense bit-vector length {bit_len} exceeds {MAX_BITS}"),
            ));
        }

        let words = bit_len.div_ceil(64) as usize;
        let mut raw = Vec::with_capacity(words.min(READ_RESERVE_WORDS));
        for _ in 0..words {
            raw.push(read_u64(&mut reader)?);
        }

        let mut bits = BitVec::from_vec(raw);
        bits.truncate(bit_len as usize);
        bits.set_uninitialized(false);
        Ok(Self { bits })
    }
}
