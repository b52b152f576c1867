//! Player state deltas: the scalar field table followed by three bitmapped
//! array sections.

use bitstream::{EntropyCoder, MsgBuffer};
use schema::{PlayerState, PLAYER_STATE_TABLE};

use crate::arrays::{read_section, write_section, Group, SlotWidth};
use crate::error::CodecResult;
use crate::fields::{changed_prefix_len, read_field_delta, write_field_delta};
use crate::observer::{DeltaObserver, NoopObserver};

const AMMO_GROUP: usize = 16;

/// Writes `to` as a delta against `from`, or against a zero record when
/// `from` is `None`.
pub fn write_delta_player_state<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: Option<&PlayerState>,
    to: &PlayerState,
) -> CodecResult<()> {
    write_delta_player_state_observed(msg, from, to, NoopObserver)
}

/// [`write_delta_player_state`] reporting scalar field changes to `observer`.
pub fn write_delta_player_state_observed<C: EntropyCoder, O: DeltaObserver>(
    msg: &mut MsgBuffer<'_, C>,
    from: Option<&PlayerState>,
    to: &PlayerState,
    observer: O,
) -> CodecResult<()> {
    let zero = PlayerState::default();
    let from = from.unwrap_or(&zero);

    let lc = changed_prefix_len(&PLAYER_STATE_TABLE, from, to);
    write_field_delta(msg, &PLAYER_STATE_TABLE, from, to, lc, observer)?;

    write_section(
        msg,
        &[
            Group::new(&from.stats, &to.stats, SlotWidth::Short),
            Group::new(&from.persistant, &to.persistant, SlotWidth::Short),
            Group::new(&from.holdable, &to.holdable, SlotWidth::Short),
            Group::new(&from.powerups, &to.powerups, SlotWidth::Long),
        ],
    )?;
    write_section(msg, &ammo_groups(&from.ammo, &to.ammo))?;
    write_section(msg, &ammo_groups(&from.ammoclip, &to.ammoclip))?;
    Ok(())
}

fn ammo_groups<'a>(from: &'a [i32], to: &'a [i32]) -> Vec<Group<'a>> {
    from.chunks(AMMO_GROUP)
        .zip(to.chunks(AMMO_GROUP))
        .map(|(old, new)| Group::new(old, new, SlotWidth::Short))
        .collect()
}

/// Reads a player state delta against `from`, or a zero record when `from`
/// is `None`.
///
/// # Errors
///
/// Returns [`crate::CodecError::InvalidFieldCount`] for a corrupt change
/// count.
pub fn read_delta_player_state<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: Option<&PlayerState>,
) -> CodecResult<PlayerState> {
    let zero = PlayerState::default();
    let from = from.unwrap_or(&zero);

    let mut to = *from;
    read_field_delta(msg, &PLAYER_STATE_TABLE, from, &mut to)?;

    read_section(
        msg,
        [
            (&mut to.stats[..], SlotWidth::Short),
            (&mut to.persistant[..], SlotWidth::Short),
            (&mut to.holdable[..], SlotWidth::Short),
            (&mut to.powerups[..], SlotWidth::Long),
        ],
    )?;
    read_section(
        msg,
        to.ammo
            .chunks_mut(AMMO_GROUP)
            .map(|slots| (slots, SlotWidth::Short)),
    )?;
    read_section(
        msg,
        to.ammoclip
            .chunks_mut(AMMO_GROUP)
            .map(|slots| (slots, SlotWidth::Short)),
    )?;
    Ok(to)
}
