//! Typed primitives and string fields on top of [`MsgBuffer`].
//!
//! The byte-level readers return `-1` once the read position has moved past
//! the received content, which is how callers tell "no more data" from a real
//! value. Strings are sanitised on both ends: bytes with the high bit set and
//! `%` are replaced with `.`.

use crate::buffer::MsgBuffer;
use crate::entropy::EntropyCoder;

/// Longest normal string field, terminator included.
pub const MAX_STRING_CHARS: usize = 1024;

/// Longest big string field, terminator included.
pub const BIG_INFO_STRING: usize = 8192;

const REPLACEMENT: u8 = b'.';

/// Quantizes an angle in degrees to 16 bits.
#[must_use]
pub fn angle_to_short(degrees: f32) -> i32 {
    ((degrees * 65536.0 / 360.0) as i32) & 0xFFFF
}

/// Expands a 16-bit angle back to degrees.
#[must_use]
pub fn short_to_angle(value: i32) -> f32 {
    value as f32 * (360.0 / 65536.0)
}

/// Hashes a string the same way before and after it crosses the wire.
///
/// Characters that the string writer would replace are hashed as the
/// replacement, so sanitisation never changes the key.
#[must_use]
pub fn hash_key(s: &str, maxlen: usize) -> i32 {
    let mut hash: i32 = 0;
    for (i, byte) in s.bytes().take(maxlen).take_while(|b| *b != 0).enumerate() {
        let c = i32::from(sanitize(byte));
        hash = hash.wrapping_add(c.wrapping_mul(119 + i as i32));
    }
    hash ^ (hash >> 10) ^ (hash >> 20)
}

const fn sanitize(byte: u8) -> u8 {
    if byte & 0x80 != 0 || byte == b'%' {
        REPLACEMENT
    } else {
        byte
    }
}

impl<'a, C: EntropyCoder> MsgBuffer<'a, C> {
    /// Writes the low 8 bits of `c` as a signed byte.
    pub fn write_char(&mut self, c: i32) {
        self.put(c, 8);
    }

    /// Writes the low 8 bits of `c`.
    pub fn write_byte(&mut self, c: i32) {
        self.put(c, 8);
    }

    /// Writes the low 16 bits of `c`.
    pub fn write_short(&mut self, c: i32) {
        self.put(c, 16);
    }

    /// Writes all 32 bits of `c`.
    pub fn write_long(&mut self, c: i32) {
        self.put(c, 32);
    }

    /// Writes the IEEE-754 bit pattern of `f`.
    pub fn write_float(&mut self, f: f32) {
        self.put(f.to_bits() as i32, 32);
    }

    /// Writes `data` one byte at a time.
    pub fn write_data(&mut self, data: &[u8]) {
        for byte in data {
            self.write_byte(i32::from(*byte));
        }
    }

    /// Writes an angle quantized to 8 bits.
    pub fn write_angle(&mut self, degrees: f32) {
        self.write_byte(((degrees * 256.0 / 360.0) as i32) & 255);
    }

    /// Writes an angle quantized to 16 bits.
    pub fn write_angle16(&mut self, degrees: f32) {
        self.write_short(angle_to_short(degrees));
    }

    /// Writes a NUL-terminated string of at most [`MAX_STRING_CHARS`] - 1 bytes.
    pub fn write_string(&mut self, s: &str) {
        self.write_limited_string(s, MAX_STRING_CHARS);
    }

    /// Writes a NUL-terminated string of at most [`BIG_INFO_STRING`] - 1 bytes.
    pub fn write_big_string(&mut self, s: &str) {
        self.write_limited_string(s, BIG_INFO_STRING);
    }

    /// Writes a NUL-terminated string bounded by `limit` (terminator included).
    ///
    /// A string that does not fit is sent as the empty string rather than cut
    /// mid-content.
    pub fn write_limited_string(&mut self, s: &str, limit: usize) {
        let bytes = s.as_bytes();
        let bytes = if bytes.len() >= limit {
            tracing::warn!(len = bytes.len(), limit, "string too long, sending empty");
            &[][..]
        } else {
            bytes
        };
        for byte in bytes {
            self.write_char(i32::from(sanitize(*byte)));
        }
        self.write_char(0);
    }

    fn past_end(&self) -> bool {
        self.readcount() > self.cursize()
    }

    /// Reads a sign-extended byte; `-1` past the end of the message.
    pub fn read_char(&mut self) -> i32 {
        let c = i32::from(self.get(8, false) as u8 as i8);
        if self.past_end() {
            -1
        } else {
            c
        }
    }

    /// Reads an unsigned byte; `-1` past the end of the message.
    pub fn read_byte(&mut self) -> i32 {
        let c = i32::from(self.get(8, false) as u8);
        if self.past_end() {
            -1
        } else {
            c
        }
    }

    /// Reads a sign-extended 16-bit value; `-1` past the end of the message.
    pub fn read_short(&mut self) -> i32 {
        let c = i32::from(self.get(16, false) as u16 as i16);
        if self.past_end() {
            -1
        } else {
            c
        }
    }

    /// Reads a 32-bit value; `-1` past the end of the message.
    pub fn read_long(&mut self) -> i32 {
        let c = self.get(32, false);
        if self.past_end() {
            -1
        } else {
            c
        }
    }

    /// Reads an IEEE-754 bit pattern; `-1.0` past the end of the message.
    pub fn read_float(&mut self) -> f32 {
        let bits = self.get(32, false) as u32;
        if self.past_end() {
            -1.0
        } else {
            f32::from_bits(bits)
        }
    }

    /// Fills `out` byte by byte; bytes past the end of the message read as 0xFF.
    pub fn read_data(&mut self, out: &mut [u8]) {
        for byte in out {
            *byte = self.read_byte() as u8;
        }
    }

    /// Reads a 16-bit angle in degrees.
    pub fn read_angle16(&mut self) -> f32 {
        short_to_angle(self.read_short())
    }

    /// Reads a string of at most [`MAX_STRING_CHARS`] - 1 bytes.
    pub fn read_string(&mut self) -> String {
        self.read_limited_string(MAX_STRING_CHARS, false)
    }

    /// Reads a string of at most [`BIG_INFO_STRING`] - 1 bytes.
    pub fn read_big_string(&mut self) -> String {
        self.read_limited_string(BIG_INFO_STRING, false)
    }

    /// Reads a string that also stops at a newline.
    pub fn read_string_line(&mut self) -> String {
        self.read_limited_string(MAX_STRING_CHARS, true)
    }

    /// Reads up to `limit - 1` characters, stopping at NUL or the end of data.
    pub fn read_limited_string(&mut self, limit: usize, stop_at_newline: bool) -> String {
        let mut out = String::new();
        loop {
            let c = self.read_byte();
            if c <= 0 || out.len() + 1 >= limit || (stop_at_newline && c == i32::from(b'\n')) {
                break;
            }
            let byte = if c > 127 || c == i32::from(b'%') {
                REPLACEMENT
            } else {
                c as u8
            };
            out.push(char::from(byte));
        }
        out
    }
}
