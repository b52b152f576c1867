//! Entity state deltas.
//!
//! Framing for one entity:
//!
//! ```text
//! removed:    number(10) 1
//! unchanged:  number(10) 0 0               (only when forced)
//! changed:    number(10) 0 1 lc fields...
//! ```

use bitstream::{EntropyCoder, MsgBuffer};
use schema::{EntityState, ENTITYNUM_NONE, ENTITY_STATE_TABLE, GENTITYNUM_BITS, MAX_GENTITIES};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::fields::{changed_prefix_len, read_field_delta, write_field_delta};
use crate::observer::{DeltaObserver, NoopObserver};

/// Writes `to` as a delta against `from`.
///
/// - `to == None` with a reference writes a removal for the reference's number.
/// - `from == None` deltas against an all-zero record.
/// - An unchanged entity writes nothing unless `force` is set.
///
/// # Errors
///
/// Returns [`CodecError::BadEntityNumber`] if `to.number` is outside
/// `0..MAX_GENTITIES`, or if a removed number is outside `0..ENTITYNUM_NONE`.
pub fn write_delta_entity<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: Option<&EntityState>,
    to: Option<&EntityState>,
    force: bool,
) -> CodecResult<()> {
    write_delta_entity_observed(msg, from, to, force, NoopObserver)
}

/// [`write_delta_entity`] reporting per-field changes to `observer`.
pub fn write_delta_entity_observed<C: EntropyCoder, O: DeltaObserver>(
    msg: &mut MsgBuffer<'_, C>,
    from: Option<&EntityState>,
    to: Option<&EntityState>,
    force: bool,
    observer: O,
) -> CodecResult<()> {
    let Some(to) = to else {
        if let Some(from) = from {
            if !(0..ENTITYNUM_NONE).contains(&from.number) {
                return Err(CodecError::BadEntityNumber {
                    number: from.number,
                });
            }
            msg.write_bits(from.number, GENTITYNUM_BITS)?;
            msg.write_bits(1, 1)?;
        }
        return Ok(());
    };

    if !(0..MAX_GENTITIES).contains(&to.number) {
        return Err(CodecError::BadEntityNumber { number: to.number });
    }

    let zero = EntityState::default();
    let from = from.unwrap_or(&zero);
    let lc = changed_prefix_len(&ENTITY_STATE_TABLE, from, to);

    if lc == 0 {
        if force {
            msg.write_bits(to.number, GENTITYNUM_BITS)?;
            msg.write_bits(0, 1)?;
            msg.write_bits(0, 1)?;
        }
        return Ok(());
    }

    msg.write_bits(to.number, GENTITYNUM_BITS)?;
    msg.write_bits(0, 1)?;
    msg.write_bits(1, 1)?;
    write_field_delta(msg, &ENTITY_STATE_TABLE, from, to, lc, observer)
}

/// Reads the entity number that prefixes every entity delta.
pub fn read_entity_number<C: EntropyCoder>(msg: &mut MsgBuffer<'_, C>) -> CodecResult<i32> {
    Ok(msg.read_bits(GENTITYNUM_BITS)?)
}

/// Reads the body of an entity delta whose number has already been read.
///
/// A removed entity decodes as a zero record numbered [`ENTITYNUM_NONE`].
///
/// # Errors
///
/// Returns [`CodecError::BadEntityNumber`] for numbers outside
/// `0..MAX_GENTITIES` and [`CodecError::InvalidFieldCount`] for a corrupt
/// change count.
pub fn read_delta_entity<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: &EntityState,
    number: i32,
) -> CodecResult<EntityState> {
    if !(0..MAX_GENTITIES).contains(&number) {
        return Err(CodecError::BadEntityNumber { number });
    }

    if msg.read_bits(1)? == 1 {
        debug!(number, "entity removed");
        return Ok(EntityState::with_number(ENTITYNUM_NONE));
    }

    let mut to = *from;
    if msg.read_bits(1)? == 1 {
        read_field_delta(msg, &ENTITY_STATE_TABLE, from, &mut to)?;
    }
    to.number = number;
    Ok(to)
}
