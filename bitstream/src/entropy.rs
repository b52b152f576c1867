//! Entropy coder interface used by the in-band (bit-packed) mode.
//!
//! The message buffer never touches bits directly while in-band; it hands
//! single bits and whole bytes to an [`EntropyCoder`] together with the bit
//! position to write at. Bits are addressed LSB-first within each byte.

/// Per-bit and per-symbol coding primitives over a byte slice.
///
/// Implementations must tolerate positions past the end of `buf`: writes there
/// are dropped and reads return zero. The message buffer relies on this to
/// detect overflow after the fact without panicking.
pub trait EntropyCoder {
    /// Stores a single raw bit at `bit_pos`.
    fn put_bit(&self, buf: &mut [u8], bit_pos: usize, bit: bool);

    /// Encodes `symbol` starting at `bit_pos`, returning the number of bits used.
    fn put_symbol(&self, buf: &mut [u8], bit_pos: usize, symbol: u8) -> usize;

    /// Loads the raw bit at `bit_pos`.
    fn get_bit(&self, buf: &[u8], bit_pos: usize) -> bool;

    /// Decodes one symbol starting at `bit_pos`, returning it with the number
    /// of bits consumed.
    fn get_symbol(&self, buf: &[u8], bit_pos: usize) -> (u8, usize);
}

impl<T: EntropyCoder + ?Sized> EntropyCoder for &T {
    fn put_bit(&self, buf: &mut [u8], bit_pos: usize, bit: bool) {
        (**self).put_bit(buf, bit_pos, bit);
    }

    fn put_symbol(&self, buf: &mut [u8], bit_pos: usize, symbol: u8) -> usize {
        (**self).put_symbol(buf, bit_pos, symbol)
    }

    fn get_bit(&self, buf: &[u8], bit_pos: usize) -> bool {
        (**self).get_bit(buf, bit_pos)
    }

    fn get_symbol(&self, buf: &[u8], bit_pos: usize) -> (u8, usize) {
        (**self).get_symbol(buf, bit_pos)
    }
}

/// Identity model: every symbol is stored as its own 8 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCoder;

impl EntropyCoder for RawCoder {
    fn put_bit(&self, buf: &mut [u8], bit_pos: usize, bit: bool) {
        store_bit(buf, bit_pos, bit);
    }

    fn put_symbol(&self, buf: &mut [u8], bit_pos: usize, symbol: u8) -> usize {
        for i in 0..8 {
            store_bit(buf, bit_pos + i, (symbol >> i) & 1 == 1);
        }
        8
    }

    fn get_bit(&self, buf: &[u8], bit_pos: usize) -> bool {
        load_bit(buf, bit_pos)
    }

    fn get_symbol(&self, buf: &[u8], bit_pos: usize) -> (u8, usize) {
        let mut symbol = 0u8;
        for i in 0..8 {
            symbol |= u8::from(load_bit(buf, bit_pos + i)) << i;
        }
        (symbol, 8)
    }
}

/// Writes one bit LSB-first; positions past the slice are dropped.
pub(crate) fn store_bit(buf: &mut [u8], bit_pos: usize, bit: bool) {
    if let Some(byte) = buf.get_mut(bit_pos >> 3) {
        let mask = 1u8 << (bit_pos & 7);
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

/// Reads one bit LSB-first; positions past the slice read as zero.
pub(crate) fn load_bit(buf: &[u8], bit_pos: usize) -> bool {
    buf.get(bit_pos >> 3)
        .is_some_and(|byte| (byte >> (bit_pos & 7)) & 1 == 1)
}
