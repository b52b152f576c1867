//! Entity lists for one snapshot, delta-coded against the previous snapshot.
//!
//! Both lists are sorted by entity number. The writer walks them together:
//! an entity in both is an unforced delta, an entity only in the new list is a
//! forced delta from its baseline, and an entity only in the old list is a
//! removal. The list ends with [`ENTITYNUM_NONE`].

use bitstream::{EntropyCoder, MsgBuffer};
use schema::{EntityState, ENTITYNUM_NONE, GENTITYNUM_BITS, MAX_GENTITIES};
use tracing::debug;

use crate::entity::{read_delta_entity, read_entity_number, write_delta_entity};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;

/// Per-number reference states for entities entering view.
#[derive(Debug, Clone)]
pub struct Baselines {
    states: Vec<EntityState>,
}

impl Default for Baselines {
    fn default() -> Self {
        Self::new()
    }
}

impl Baselines {
    /// One zero record per entity number.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: (0..MAX_GENTITIES).map(EntityState::with_number).collect(),
        }
    }

    /// Stores `state` as the baseline for its number.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BadEntityNumber`] if the number is out of range.
    pub fn set(&mut self, state: EntityState) -> CodecResult<()> {
        let slot = usize::try_from(state.number)
            .ok()
            .and_then(|index| self.states.get_mut(index))
            .ok_or(CodecError::BadEntityNumber {
                number: state.number,
            })?;
        *slot = state;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, number: i32) -> Option<&EntityState> {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.states.get(index))
    }

    fn lookup(&self, number: i32) -> CodecResult<&EntityState> {
        self.get(number).ok_or(CodecError::BadEntityNumber { number })
    }
}

/// Writes the change from `from` to `to`, followed by the list terminator.
///
/// # Errors
///
/// Returns [`CodecError::InvalidEntityOrder`] if either list is not strictly
/// ascending, and [`CodecError::BadEntityNumber`] for numbers outside
/// `0..ENTITYNUM_NONE`.
pub fn write_packet_entities<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: &[EntityState],
    to: &[EntityState],
    baselines: &Baselines,
) -> CodecResult<()> {
    validate_list(from)?;
    validate_list(to)?;

    let (mut old, mut new) = (from.iter().peekable(), to.iter().peekable());
    loop {
        match (old.peek().copied(), new.peek().copied()) {
            (None, None) => break,
            (Some(o), Some(n)) if o.number == n.number => {
                write_delta_entity(msg, Some(o), Some(n), false)?;
                old.next();
                new.next();
            }
            (Some(o), Some(n)) if n.number > o.number => {
                write_delta_entity(msg, Some(o), None, true)?;
                old.next();
            }
            (Some(o), None) => {
                write_delta_entity(msg, Some(o), None, true)?;
                old.next();
            }
            (_, Some(n)) => {
                let baseline = baselines.lookup(n.number)?;
                write_delta_entity(msg, Some(baseline), Some(n), true)?;
                new.next();
            }
        }
    }

    msg.write_bits(ENTITYNUM_NONE, GENTITYNUM_BITS)?;
    Ok(())
}

/// Reads an entity list written by [`write_packet_entities`] against `from`.
///
/// # Errors
///
/// Returns [`CodecError::InvalidEntityOrder`] when numbers do not ascend,
/// [`CodecError::LimitsExceeded`] when the list outgrows
/// `limits.max_packet_entities`, and any entity decode error.
pub fn read_packet_entities<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: &[EntityState],
    baselines: &Baselines,
    limits: &CodecLimits,
) -> CodecResult<Vec<EntityState>> {
    let mut out = Vec::with_capacity(from.len());
    let mut old = from.iter().peekable();
    let mut previous = -1;
    let mut removed = 0usize;

    loop {
        let number = read_entity_number(msg)?;
        if number == ENTITYNUM_NONE {
            break;
        }
        if number <= previous {
            return Err(CodecError::InvalidEntityOrder {
                previous,
                current: number,
            });
        }
        previous = number;

        while let Some(carried) = old.next_if(|o| o.number < number) {
            push_limited(&mut out, *carried, limits)?;
        }

        let reference = match old.next_if(|o| o.number == number) {
            Some(o) => o,
            None => baselines.lookup(number)?,
        };
        let state = read_delta_entity(msg, reference, number)?;
        if state.number == ENTITYNUM_NONE {
            removed += 1;
            continue;
        }
        push_limited(&mut out, state, limits)?;
    }

    for carried in old {
        push_limited(&mut out, *carried, limits)?;
    }

    debug!(entities = out.len(), removed, "packet entities read");
    Ok(out)
}

fn push_limited(
    out: &mut Vec<EntityState>,
    state: EntityState,
    limits: &CodecLimits,
) -> CodecResult<()> {
    if out.len() >= limits.max_packet_entities {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::PacketEntities,
            limit: limits.max_packet_entities,
            actual: out.len() + 1,
        });
    }
    out.push(state);
    Ok(())
}

/// Every number must fit below the terminator and the list must ascend.
fn validate_list(list: &[EntityState]) -> CodecResult<()> {
    if let Some(bad) = list
        .iter()
        .find(|state| !(0..ENTITYNUM_NONE).contains(&state.number))
    {
        return Err(CodecError::BadEntityNumber { number: bad.number });
    }
    for pair in list.windows(2) {
        if pair[0].number >= pair[1].number {
            return Err(CodecError::InvalidEntityOrder {
                previous: pair[0].number,
                current: pair[1].number,
            });
        }
    }
    Ok(())
}
