//! Message buffer with independent write and read cursors.

use crate::entropy::{EntropyCoder, RawCoder};
use crate::error::{BitError, BitResult};

/// A bounded message buffer over a caller-supplied byte slice.
///
/// Writes and reads move separate cursors, so a buffer that was just filled can
/// be read back after [`begin_reading`](Self::begin_reading) without copying.
/// In-band (bit-packed) traffic goes through the [`EntropyCoder`]; out-of-band
/// traffic is byte aligned and stored little-endian.
///
/// Running out of room latches [`is_overflowed`](Self::is_overflowed) and drops
/// every later write in the message. Running out of data makes reads return
/// zero. Only invalid widths are reported as errors.
#[derive(Debug)]
pub struct MsgBuffer<'a, C = RawCoder> {
    data: &'a mut [u8],
    maxsize: usize,
    maxbits: usize,
    /// Bytes of content; the write position in out-of-band mode.
    cursize: usize,
    /// Write cursor in bits.
    bit: usize,
    /// Read position in bytes.
    readcount: usize,
    /// Read cursor in bits.
    read_bit: usize,
    overflowed: bool,
    oob: bool,
    /// Bits requested by callers before entropy coding.
    uncompsize: usize,
    coder: C,
}

impl<'a> MsgBuffer<'a, RawCoder> {
    /// Creates an in-band buffer using the whole slice as capacity.
    #[must_use]
    pub fn init(data: &'a mut [u8]) -> Self {
        let maxsize = data.len();
        Self {
            data,
            maxsize,
            maxbits: maxsize * 8,
            cursize: 0,
            bit: 0,
            readcount: 0,
            read_bit: 0,
            overflowed: false,
            oob: false,
            uncompsize: 0,
            coder: RawCoder,
        }
    }

    /// Creates a buffer whose writes are byte aligned and uncompressed.
    #[must_use]
    pub fn init_oob(data: &'a mut [u8]) -> Self {
        let mut msg = Self::init(data);
        msg.oob = true;
        msg
    }
}

impl<'a, C: EntropyCoder> MsgBuffer<'a, C> {
    /// Replaces the entropy coder used by in-band reads and writes.
    #[must_use]
    pub fn with_coder<D: EntropyCoder>(self, coder: D) -> MsgBuffer<'a, D> {
        MsgBuffer {
            data: self.data,
            maxsize: self.maxsize,
            maxbits: self.maxbits,
            cursize: self.cursize,
            bit: self.bit,
            readcount: self.readcount,
            read_bit: self.read_bit,
            overflowed: self.overflowed,
            oob: self.oob,
            uncompsize: self.uncompsize,
            coder,
        }
    }

    /// Marks the first `len` bytes as received content (clamped to capacity).
    #[must_use]
    pub fn with_len(mut self, len: usize) -> Self {
        self.cursize = len.min(self.maxsize);
        self
    }

    /// Resets the write cursor and overflow flag; content is left untouched.
    pub fn clear(&mut self) {
        self.cursize = 0;
        self.overflowed = false;
        self.bit = 0;
    }

    /// Switches subsequent traffic to bit-packed mode.
    pub fn set_bitstream_mode(&mut self) {
        self.oob = false;
    }

    /// Pads the write cursor to a byte boundary and switches to raw mode.
    pub fn set_uncompressed_mode(&mut self) {
        self.bit = (self.bit + 7) & !7;
        self.oob = true;
    }

    /// Starts an in-band read session from the beginning of the buffer.
    pub fn begin_reading(&mut self) {
        self.readcount = 0;
        self.read_bit = 0;
        self.oob = false;
    }

    /// Starts an out-of-band read session from the beginning of the buffer.
    pub fn begin_reading_oob(&mut self) {
        self.readcount = 0;
        self.read_bit = 0;
        self.oob = true;
    }

    /// Pads the read cursor to a byte boundary and switches to raw mode.
    pub fn begin_reading_uncompressed(&mut self) {
        self.read_bit = (self.read_bit + 7) & !7;
        self.oob = true;
    }

    /// Copies this message into `dest`, returning a buffer with the same
    /// cursors and mode backed by the new slice.
    pub fn copy_into<'b>(&self, dest: &'b mut [u8]) -> BitResult<MsgBuffer<'b, C>>
    where
        C: Clone,
    {
        if dest.len() < self.cursize {
            return Err(BitError::CopyTooSmall {
                needed: self.cursize,
                available: dest.len(),
            });
        }
        dest[..self.cursize].copy_from_slice(&self.data[..self.cursize]);
        let maxsize = dest.len();
        Ok(MsgBuffer {
            data: dest,
            maxsize,
            maxbits: maxsize * 8,
            cursize: self.cursize,
            bit: self.bit,
            readcount: self.readcount,
            read_bit: self.read_bit,
            overflowed: self.overflowed,
            oob: self.oob,
            uncompsize: self.uncompsize,
            coder: self.coder.clone(),
        })
    }

    /// Writes the low `|bits|` bits of `value`.
    ///
    /// The sign of `bits` only matters to the reader. Once the buffer has
    /// overflowed the call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits` is zero or its magnitude
    /// exceeds 32, and [`BitError::UnsupportedRawWidth`] for out-of-band widths
    /// other than 8, 16 and 32.
    pub fn write_bits(&mut self, value: i32, bits: i32) -> BitResult<()> {
        let width = self.checked_width(bits)?;
        self.put(value, width);
        Ok(())
    }

    /// Reads `|bits|` bits, sign-extending the result when `bits` is negative.
    ///
    /// Reading at or past the end of the buffer yields zero.
    ///
    /// # Errors
    ///
    /// Same width rules as [`write_bits`](Self::write_bits).
    pub fn read_bits(&mut self, bits: i32) -> BitResult<i32> {
        let width = self.checked_width(bits)?;
        Ok(self.get(width, bits < 0))
    }

    fn checked_width(&self, bits: i32) -> BitResult<u32> {
        if bits == 0 || !(-32..=32).contains(&bits) {
            return Err(BitError::InvalidBitCount { bits });
        }
        let width = bits.unsigned_abs();
        if self.oob && !matches!(width, 8 | 16 | 32) {
            return Err(BitError::UnsupportedRawWidth { bits: width });
        }
        Ok(width)
    }

    /// Writes a width already validated for the current mode.
    pub(crate) fn put(&mut self, value: i32, width: u32) {
        if self.overflowed {
            return;
        }
        self.uncompsize += width as usize;

        if self.oob {
            let len = (width / 8) as usize;
            let end = self.cursize + len;
            let Some(slot) = self.data.get_mut(self.cursize..end) else {
                self.overflowed = true;
                return;
            };
            slot.copy_from_slice(&value.to_le_bytes()[..len]);
            self.cursize = end;
            self.bit += len * 8;
        } else {
            let mut value = (value as u32) & low_mask(width);
            let mut bit = self.bit;
            let nbits = width & 7;
            for _ in 0..nbits {
                self.coder.put_bit(self.data, bit, value & 1 == 1);
                bit += 1;
                value >>= 1;
            }
            for _ in 0..(width - nbits) / 8 {
                bit += self.coder.put_symbol(self.data, bit, (value & 0xFF) as u8);
                value >>= 8;
            }
            if bit > self.maxbits {
                // Dropped: the cursor stays where the message still fits.
                self.overflowed = true;
                return;
            }
            self.bit = bit;
            self.cursize = ((bit >> 3) + 1).min(self.maxsize);
        }

        if self.bit > self.maxbits {
            self.overflowed = true;
        }
    }

    /// Reads a width already validated for the current mode.
    pub(crate) fn get(&mut self, width: u32, sign_extend: bool) -> i32 {
        if self.read_bit >= self.maxbits {
            return 0;
        }

        let mut value: u32 = 0;
        if self.oob {
            let len = (width / 8) as usize;
            let mut bytes = [0u8; 4];
            for (offset, byte) in bytes.iter_mut().take(len).enumerate() {
                *byte = self.data.get(self.readcount + offset).copied().unwrap_or(0);
            }
            value = u32::from_le_bytes(bytes);
            self.readcount += len;
            self.read_bit += len * 8;
        } else {
            let nbits = width & 7;
            let mut bit = self.read_bit;
            for i in 0..nbits {
                value |= u32::from(self.coder.get_bit(self.data, bit)) << i;
                bit += 1;
            }
            for i in (0..width - nbits).step_by(8) {
                let (symbol, used) = self.coder.get_symbol(self.data, bit);
                value |= u32::from(symbol) << (i + nbits);
                bit += used;
            }
            self.read_bit = bit;
            self.readcount = (bit >> 3) + 1;
        }

        if sign_extend && width < 32 && value & (1 << (width - 1)) != 0 {
            value |= !low_mask(width);
        }
        value as i32
    }

    /// Returns the content length in bytes.
    #[must_use]
    pub const fn cursize(&self) -> usize {
        self.cursize
    }

    /// Returns the capacity in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.maxsize
    }

    /// Returns the write cursor in bits.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit
    }

    /// Returns the total bits callers asked to write, before entropy coding.
    #[must_use]
    pub const fn uncompressed_bits(&self) -> usize {
        self.uncompsize
    }

    /// Returns the read cursor in bits.
    #[must_use]
    pub const fn read_position(&self) -> usize {
        self.read_bit
    }

    /// Returns the read position in bytes.
    #[must_use]
    pub const fn readcount(&self) -> usize {
        self.readcount
    }

    /// Returns `true` once a write has been dropped for lack of room.
    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns `true` while in out-of-band (raw) mode.
    #[must_use]
    pub const fn is_oob(&self) -> bool {
        self.oob
    }

    /// Returns the written content.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.cursize]
    }

    /// Returns the entropy coder.
    #[must_use]
    pub const fn coder(&self) -> &C {
        &self.coder
    }
}

const fn low_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_zeroes_cursors() {
        let mut buf = [0xEEu8; 16];
        let msg = MsgBuffer::init(&mut buf);
        assert_eq!(msg.cursize(), 0);
        assert_eq!(msg.bits_written(), 0);
        assert_eq!(msg.read_position(), 0);
        assert_eq!(msg.capacity(), 16);
        assert!(!msg.is_overflowed());
        assert!(!msg.is_oob());
    }

    #[test]
    fn packed_bits_are_lsb_first() {
        let mut buf = [0u8; 4];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(0b101, 3).unwrap();
        msg.write_bits(0xAB, 8).unwrap();
        assert_eq!(msg.bits_written(), 11);
        assert_eq!(msg.cursize(), 2);
        // 101 then 0xAB shifted up by three bits
        assert_eq!(msg.as_bytes(), &[0b0101_1101, 0b0000_0101]);
    }

    #[test]
    fn cursize_tracks_bit_cursor() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(1, 1).unwrap();
        assert_eq!(msg.cursize(), 1);
        msg.write_bits(0, 7).unwrap();
        assert_eq!(msg.cursize(), 2);
        msg.write_bits(0x1234, 16).unwrap();
        assert_eq!(msg.cursize(), (24 >> 3) + 1);
    }

    #[test]
    fn oob_writes_are_little_endian() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init_oob(&mut buf);
        msg.write_bits(0x7F, 8).unwrap();
        msg.write_bits(0x1234, 16).unwrap();
        msg.write_bits(0x0102_0304, 32).unwrap();
        assert_eq!(msg.cursize(), 7);
        assert_eq!(msg.bits_written(), 56);
        assert_eq!(msg.as_bytes(), &[0x7F, 0x34, 0x12, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn oob_rejects_odd_widths() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init_oob(&mut buf);
        assert_eq!(
            msg.write_bits(1, 12),
            Err(BitError::UnsupportedRawWidth { bits: 12 })
        );
        msg.begin_reading_oob();
        assert_eq!(
            msg.read_bits(4),
            Err(BitError::UnsupportedRawWidth { bits: 4 })
        );
    }

    #[test]
    fn invalid_widths_are_fatal() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        for bits in [0, 33, -33, 64] {
            assert_eq!(
                msg.write_bits(1, bits),
                Err(BitError::InvalidBitCount { bits })
            );
            assert_eq!(msg.read_bits(bits), Err(BitError::InvalidBitCount { bits }));
        }
    }

    #[test]
    fn overflow_latches_and_drops_later_writes() {
        let mut buf = [0u8; 2];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(0xFF, 8).unwrap();
        msg.write_bits(0xFFFF, 16).unwrap();
        assert!(msg.is_overflowed());
        assert_eq!(msg.bits_written(), 8);
        msg.write_bits(1, 1).unwrap();
        assert_eq!(msg.bits_written(), 8);
        assert!(msg.cursize() <= msg.capacity());
    }

    #[test]
    fn oob_overflow_latches() {
        let mut buf = [0u8; 3];
        let mut msg = MsgBuffer::init_oob(&mut buf);
        msg.write_bits(0x0102, 16).unwrap();
        msg.write_bits(0x0304, 16).unwrap();
        assert!(msg.is_overflowed());
        assert_eq!(msg.cursize(), 2);
        msg.write_bits(5, 8).unwrap();
        assert_eq!(msg.cursize(), 2);
    }

    #[test]
    fn clear_resets_write_state_only() {
        let mut buf = [0u8; 1];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(0x5A, 8).unwrap();
        msg.write_bits(1, 8).unwrap();
        assert!(msg.is_overflowed());
        msg.clear();
        assert!(!msg.is_overflowed());
        assert_eq!(msg.cursize(), 0);
        assert_eq!(msg.bits_written(), 0);
        msg.begin_reading();
        assert_eq!(msg.read_bits(8).unwrap(), 0x5A);
    }

    #[test]
    fn read_cursor_is_independent_of_write_cursor() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(3, 2).unwrap();
        msg.begin_reading();
        assert_eq!(msg.read_bits(2).unwrap(), 3);
        msg.write_bits(9, 4).unwrap();
        assert_eq!(msg.bits_written(), 6);
        assert_eq!(msg.read_bits(4).unwrap(), 9);
    }

    #[test]
    fn reads_past_capacity_return_zero() {
        let mut buf = [0xFFu8; 1];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.begin_reading();
        assert_eq!(msg.read_bits(8).unwrap(), 0xFF);
        assert_eq!(msg.read_bits(8).unwrap(), 0);
        assert_eq!(msg.read_bits(32).unwrap(), 0);
        assert_eq!(msg.read_bits(-16).unwrap(), 0);
    }

    #[test]
    fn negative_width_sign_extends() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(-5, -16).unwrap();
        msg.write_bits(-5, 16).unwrap();
        msg.begin_reading();
        assert_eq!(msg.read_bits(-16).unwrap(), -5);
        assert_eq!(msg.read_bits(16).unwrap(), 0xFFFB);
    }

    #[test]
    fn uncompressed_switch_pads_to_byte() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(1, 3).unwrap();
        msg.set_uncompressed_mode();
        assert!(msg.is_oob());
        msg.write_bits(0xBEEF, 16).unwrap();
        assert_eq!(msg.as_bytes(), &[0x01, 0xEF, 0xBE]);

        msg.begin_reading();
        assert_eq!(msg.read_bits(3).unwrap(), 1);
        msg.begin_reading_uncompressed();
        assert_eq!(msg.read_bits(16).unwrap(), 0xBEEF);
    }

    #[test]
    fn oob_reads_past_data_are_zero_filled() {
        let mut buf = [0x11u8, 0x22, 0x33];
        let mut msg = MsgBuffer::init_oob(&mut buf);
        msg.begin_reading_oob();
        assert_eq!(msg.read_bits(16).unwrap(), 0x2211);
        assert_eq!(msg.read_bits(32).unwrap(), 0x33);
        assert_eq!(msg.read_bits(8).unwrap(), 0);
    }

    #[test]
    fn copy_into_preserves_content_and_cursors() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(0x3FF, 10).unwrap();

        let mut small = [0u8; 1];
        assert!(matches!(
            msg.copy_into(&mut small),
            Err(BitError::CopyTooSmall { needed: 2, available: 1 })
        ));

        let mut dest = [0u8; 4];
        let mut copy = msg.copy_into(&mut dest).unwrap();
        assert_eq!(copy.bits_written(), 10);
        copy.begin_reading();
        assert_eq!(copy.read_bits(10).unwrap(), 0x3FF);
    }

    #[test]
    fn with_len_clamps_to_capacity() {
        let mut buf = [0u8; 4];
        let msg = MsgBuffer::init(&mut buf).with_len(10);
        assert_eq!(msg.cursize(), 4);
    }

    #[test]
    fn uncompressed_bits_count_requested_widths() {
        let mut buf = [0u8; 8];
        let mut msg = MsgBuffer::init(&mut buf);
        msg.write_bits(1, 1).unwrap();
        msg.write_bits(-1, -12).unwrap();
        assert_eq!(msg.uncompressed_bits(), 13);
    }
}
