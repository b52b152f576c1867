//! The field-table delta engine shared by entity and player state.
//!
//! A delta is a change count `lc` in one byte, followed by one change bit per
//! field for the first `lc` fields of the table. Fields past `lc` are copied
//! from the reference record on read.

use bitstream::{EntropyCoder, MsgBuffer};
use schema::{FieldKind, FieldScheme, FieldTable, NetField};
use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::observer::DeltaObserver;

/// Width of the biased small-integer float encoding.
pub const FLOAT_INT_BITS: i32 = 13;

/// Bias added to small-integer floats so they fit in [`FLOAT_INT_BITS`].
pub const FLOAT_INT_BIAS: i32 = 1 << (FLOAT_INT_BITS - 1);

/// One past the index of the last field whose word differs, or zero.
#[must_use]
pub fn changed_prefix_len<R: 'static>(table: &FieldTable<R>, from: &R, to: &R) -> usize {
    table
        .fields
        .iter()
        .rposition(|field| field.word(from) != field.word(to))
        .map_or(0, |index| index + 1)
}

/// Returns the integer value of `full` when it survives the 13-bit shortcut.
#[allow(clippy::float_cmp)]
fn small_int(full: f32) -> Option<i32> {
    let trunc = full as i32;
    let biased = i64::from(trunc) + i64::from(FLOAT_INT_BIAS);
    (trunc as f32 == full && (0..1i64 << FLOAT_INT_BITS).contains(&biased)).then_some(trunc)
}

/// Writes the change count and the first `lc` fields of `to` against `from`.
///
/// `lc` is normally [`changed_prefix_len`]; it is taken as a parameter so the
/// framing code can decide what to send before anything is written.
pub fn write_field_delta<R: 'static, C: EntropyCoder, O: DeltaObserver>(
    msg: &mut MsgBuffer<'_, C>,
    table: &FieldTable<R>,
    from: &R,
    to: &R,
    lc: usize,
    mut observer: O,
) -> CodecResult<()> {
    debug_assert!(lc <= table.len());
    msg.write_byte(lc as i32);

    for (index, field) in table.fields.iter().take(lc).enumerate() {
        let word = field.word(to);
        if field.word(from) == word {
            msg.write_bits(0, 1)?;
            observer.field_unchanged(table.name, index);
            continue;
        }
        msg.write_bits(1, 1)?;
        observer.field_changed(table.name, index, field.name);

        match table.scheme {
            FieldScheme::Guarded => write_guarded(msg, field, word)?,
            FieldScheme::Bare => write_bare(msg, field, word)?,
        }
    }
    Ok(())
}

fn write_guarded<R, C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    field: &NetField<R>,
    word: u32,
) -> CodecResult<()> {
    if field.kind.is_float() {
        let full = f32::from_bits(word);
        if full == 0.0 {
            msg.write_bits(0, 1)?;
            return Ok(());
        }
        msg.write_bits(1, 1)?;
        write_float_body(msg, word)
    } else {
        if word == 0 {
            msg.write_bits(0, 1)?;
            return Ok(());
        }
        msg.write_bits(1, 1)?;
        msg.write_bits(word as i32, field.kind.wire_bits())?;
        Ok(())
    }
}

fn write_bare<R, C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    field: &NetField<R>,
    word: u32,
) -> CodecResult<()> {
    if field.kind.is_float() {
        write_float_body(msg, word)
    } else {
        msg.write_bits(word as i32, field.kind.wire_bits())?;
        Ok(())
    }
}

fn write_float_body<C: EntropyCoder>(msg: &mut MsgBuffer<'_, C>, word: u32) -> CodecResult<()> {
    match small_int(f32::from_bits(word)) {
        Some(trunc) => {
            msg.write_bits(0, 1)?;
            msg.write_bits(trunc + FLOAT_INT_BIAS, FLOAT_INT_BITS)?;
        }
        None => {
            msg.write_bits(1, 1)?;
            msg.write_bits(word as i32, 32)?;
        }
    }
    Ok(())
}

/// Reads a field delta into `to`, using `from` for unchanged and trailing
/// fields.
///
/// # Errors
///
/// Returns [`CodecError::InvalidFieldCount`] when the change count is
/// negative (the message ended) or larger than the table.
pub fn read_field_delta<R: 'static, C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    table: &FieldTable<R>,
    from: &R,
    to: &mut R,
) -> CodecResult<()> {
    let count = msg.read_byte();
    let lc = usize::try_from(count)
        .ok()
        .filter(|lc| *lc <= table.len())
        .ok_or(CodecError::InvalidFieldCount {
            table: table.name,
            count,
            max: table.len(),
        })?;

    for field in &table.fields[..lc] {
        if msg.read_bits(1)? == 0 {
            field.copy(from, to);
            continue;
        }
        let word = match table.scheme {
            FieldScheme::Guarded => read_guarded(msg, field.kind)?,
            FieldScheme::Bare => read_bare(msg, field.kind)?,
        };
        field.store(to, word);
    }
    for field in &table.fields[lc..] {
        field.copy(from, to);
    }

    trace!(table = table.name, lc, bits = msg.read_position(), "field delta read");
    Ok(())
}

fn read_guarded<C: EntropyCoder>(msg: &mut MsgBuffer<'_, C>, kind: FieldKind) -> CodecResult<u32> {
    if msg.read_bits(1)? == 0 {
        return Ok(0);
    }
    read_bare(msg, kind)
}

fn read_bare<C: EntropyCoder>(msg: &mut MsgBuffer<'_, C>, kind: FieldKind) -> CodecResult<u32> {
    if !kind.is_float() {
        return Ok(msg.read_bits(kind.wire_bits())? as u32);
    }
    if msg.read_bits(1)? == 0 {
        let trunc = msg.read_bits(FLOAT_INT_BITS)? - FLOAT_INT_BIAS;
        Ok((trunc as f32).to_bits())
    } else {
        Ok(msg.read_bits(32)? as u32)
    }
}
