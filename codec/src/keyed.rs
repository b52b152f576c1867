//! Keyed delta values: one change bit, then the new value XORed with a key.
//!
//! The key is a light obfuscation shared by both peers, not a cipher.

use bitstream::{EntropyCoder, MsgBuffer};

use crate::error::CodecResult;

/// Writes `new` against `old`, XORed with `key` when it changed.
pub fn write_delta_key<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    key: i32,
    old: i32,
    new: i32,
    bits: i32,
) -> CodecResult<()> {
    if old == new {
        msg.write_bits(0, 1)?;
        return Ok(());
    }
    msg.write_bits(1, 1)?;
    msg.write_bits(new ^ key, bits)?;
    Ok(())
}

/// Reads a keyed delta, returning `old` when the change bit is clear.
///
/// The key is masked to the field width before it is removed, so the result
/// never carries bits above `|bits|`.
pub fn read_delta_key<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    key: i32,
    old: i32,
    bits: i32,
) -> CodecResult<i32> {
    if msg.read_bits(1)? == 0 {
        return Ok(old);
    }
    let value = msg.read_bits(bits)?;
    Ok(value ^ (key & key_mask(bits)))
}

/// Unkeyed variant of [`write_delta_key`].
pub fn write_delta<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    old: i32,
    new: i32,
    bits: i32,
) -> CodecResult<()> {
    write_delta_key(msg, 0, old, new, bits)
}

/// Unkeyed variant of [`read_delta_key`].
pub fn read_delta<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    old: i32,
    bits: i32,
) -> CodecResult<i32> {
    read_delta_key(msg, 0, old, bits)
}

const fn key_mask(bits: i32) -> i32 {
    let width = bits.unsigned_abs();
    if width >= 32 {
        -1
    } else {
        ((1u32 << width) - 1) as i32
    }
}
