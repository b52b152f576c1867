//! Entity state: the per-entity record carried in snapshots.

use crate::field::{net_field, NetField};
use crate::table::{FieldScheme, FieldTable};

/// Bits used to send an entity number.
pub const GENTITYNUM_BITS: i32 = 10;

/// Number of addressable entities.
pub const MAX_GENTITIES: i32 = 1 << GENTITYNUM_BITS;

/// Entity number marking "no entity"; also terminates packet entity lists and
/// tags removed entities.
pub const ENTITYNUM_NONE: i32 = MAX_GENTITIES - 1;

/// Bits used to send an animation index.
pub const ANIM_BITS: i32 = 10;

/// A parametric motion path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[repr(C)]
pub struct Trajectory {
    pub tr_type: i32,
    pub tr_time: i32,
    pub tr_duration: i32,
    pub tr_base: [f32; 3],
    pub tr_delta: [f32; 3],
}

/// The networked state of one entity.
///
/// Every member is a 4-byte word. `number` identifies the entity and is sent
/// by the framing, not the field table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[repr(C)]
pub struct EntityState {
    pub number: i32,
    pub e_type: i32,
    pub e_flags: i32,

    pub pos: Trajectory,
    pub apos: Trajectory,

    pub time: i32,
    pub time2: i32,

    pub origin: [f32; 3],
    pub origin2: [f32; 3],
    pub angles: [f32; 3],
    pub angles2: [f32; 3],

    pub other_entity_num: i32,
    pub other_entity_num2: i32,
    pub ground_entity_num: i32,

    pub constant_light: i32,
    pub dl_intensity: i32,
    pub loop_sound: i32,

    pub modelindex: i32,
    pub modelindex2: i32,
    pub client_num: i32,
    pub frame: i32,
    pub solid: i32,

    pub event: i32,
    pub event_parm: i32,
    pub event_sequence: i32,
    pub events: [i32; 4],
    pub event_parms: [i32; 4],

    pub powerups: i32,
    pub weapon: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub density: i32,
    pub dmg_flags: i32,
    pub on_fire_start: i32,
    pub on_fire_end: i32,
    pub next_weapon: i32,
    pub team_num: i32,
    pub effect1_time: i32,
    pub effect2_time: i32,
    pub effect3_time: i32,
    pub anim_movetype: i32,
    pub ai_state: i32,
}

impl EntityState {
    /// An all-zero record tagged with `number`.
    #[must_use]
    pub fn with_number(number: i32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }
}

macro_rules! es {
    ($($t:tt)+) => {
        net_field!(EntityState, $($t)+)
    };
}

/// Entity fields in wire order.
pub static ENTITY_STATE_FIELDS: [NetField<EntityState>; 71] = [
    es!("e_type", 8, e_type),
    es!("e_flags", 24, e_flags),
    es!("pos.tr_type", 8, pos.tr_type),
    es!("pos.tr_time", 32, pos.tr_time),
    es!("pos.tr_duration", 32, pos.tr_duration),
    es!("pos.tr_base[0]", 0, pos.tr_base[0]),
    es!("pos.tr_base[1]", 0, pos.tr_base[1]),
    es!("pos.tr_base[2]", 0, pos.tr_base[2]),
    es!("pos.tr_delta[0]", 0, pos.tr_delta[0]),
    es!("pos.tr_delta[1]", 0, pos.tr_delta[1]),
    es!("pos.tr_delta[2]", 0, pos.tr_delta[2]),
    es!("apos.tr_type", 8, apos.tr_type),
    es!("apos.tr_time", 32, apos.tr_time),
    es!("apos.tr_duration", 32, apos.tr_duration),
    es!("apos.tr_base[0]", 0, apos.tr_base[0]),
    es!("apos.tr_base[1]", 0, apos.tr_base[1]),
    es!("apos.tr_base[2]", 0, apos.tr_base[2]),
    es!("apos.tr_delta[0]", 0, apos.tr_delta[0]),
    es!("apos.tr_delta[1]", 0, apos.tr_delta[1]),
    es!("apos.tr_delta[2]", 0, apos.tr_delta[2]),
    es!("time", 32, time),
    es!("time2", 32, time2),
    es!("origin[0]", 0, origin[0]),
    es!("origin[1]", 0, origin[1]),
    es!("origin[2]", 0, origin[2]),
    es!("origin2[0]", 0, origin2[0]),
    es!("origin2[1]", 0, origin2[1]),
    es!("origin2[2]", 0, origin2[2]),
    es!("angles[0]", 0, angles[0]),
    es!("angles[1]", 0, angles[1]),
    es!("angles[2]", 0, angles[2]),
    es!("angles2[0]", 0, angles2[0]),
    es!("angles2[1]", 0, angles2[1]),
    es!("angles2[2]", 0, angles2[2]),
    es!("other_entity_num", GENTITYNUM_BITS, other_entity_num),
    es!("other_entity_num2", GENTITYNUM_BITS, other_entity_num2),
    es!("ground_entity_num", GENTITYNUM_BITS, ground_entity_num),
    es!("loop_sound", 8, loop_sound),
    es!("constant_light", 32, constant_light),
    // carries corona colours too
    es!("dl_intensity", 32, dl_intensity),
    es!("modelindex", 9, modelindex),
    es!("modelindex2", 9, modelindex2),
    es!("frame", 16, frame),
    es!("client_num", 8, client_num),
    es!("solid", 24, solid),
    es!("event", 10, event),
    es!("event_parm", 8, event_parm),
    es!("event_sequence", 8, event_sequence),
    es!("events[0]", 8, events[0]),
    es!("events[1]", 8, events[1]),
    es!("events[2]", 8, events[2]),
    es!("events[3]", 8, events[3]),
    es!("event_parms[0]", 8, event_parms[0]),
    es!("event_parms[1]", 8, event_parms[1]),
    es!("event_parms[2]", 8, event_parms[2]),
    es!("event_parms[3]", 8, event_parms[3]),
    es!("powerups", 16, powerups),
    es!("weapon", 8, weapon),
    es!("legs_anim", ANIM_BITS, legs_anim),
    es!("torso_anim", ANIM_BITS, torso_anim),
    es!("density", 10, density),
    es!("dmg_flags", 32, dmg_flags),
    es!("on_fire_start", 32, on_fire_start),
    es!("on_fire_end", 32, on_fire_end),
    es!("next_weapon", 8, next_weapon),
    es!("team_num", 8, team_num),
    es!("effect1_time", 32, effect1_time),
    es!("effect2_time", 32, effect2_time),
    es!("effect3_time", 32, effect3_time),
    es!("anim_movetype", 4, anim_movetype),
    es!("ai_state", 2, ai_state),
];

/// The entity delta table (guarded scheme).
pub static ENTITY_STATE_TABLE: FieldTable<EntityState> =
    FieldTable::new("entity_state", FieldScheme::Guarded, &ENTITY_STATE_FIELDS).mirrors_record();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn table_mirrors_record() {
        assert_eq!(std::mem::size_of::<EntityState>(), 72 * 4);
        assert_eq!(ENTITY_STATE_TABLE.record_words, Some(72));
        ENTITY_STATE_TABLE.validate().unwrap();
    }

    #[test]
    fn constants() {
        assert_eq!(MAX_GENTITIES, 1024);
        assert_eq!(ENTITYNUM_NONE, 1023);
    }

    #[test]
    fn every_field_addresses_its_own_word() {
        let mut record = EntityState::default();
        for (i, field) in ENTITY_STATE_FIELDS.iter().enumerate() {
            field.store(&mut record, i as u32 + 1);
        }
        for (i, field) in ENTITY_STATE_FIELDS.iter().enumerate() {
            assert_eq!(field.word(&record), i as u32 + 1, "{}", field.name);
        }
        assert_eq!(record.number, 0);
    }

    #[test]
    fn widths_follow_layout() {
        let kind = |name: &str| {
            let index = ENTITY_STATE_TABLE.field_index(name).unwrap();
            ENTITY_STATE_FIELDS[index].kind
        };
        assert_eq!(kind("e_type"), FieldKind::Int { bits: 8 });
        assert_eq!(kind("origin[0]"), FieldKind::Float);
        assert_eq!(kind("ground_entity_num"), FieldKind::Int { bits: 10 });
        assert_eq!(kind("ai_state"), FieldKind::Int { bits: 2 });
        assert_eq!(ENTITY_STATE_TABLE.field_index("origin[0]"), Some(22));
    }

    #[test]
    fn with_number_zeroes_the_rest() {
        let state = EntityState::with_number(42);
        assert_eq!(state.number, 42);
        assert_eq!(state, EntityState { number: 42, ..EntityState::default() });
    }
}
