//! Player state: the owning client's full view of its own player.

use crate::entity::{ANIM_BITS, GENTITYNUM_BITS};
use crate::field::{net_field, NetField};
use crate::table::{FieldScheme, FieldTable};

pub const MAX_STATS: usize = 16;
pub const MAX_PERSISTANT: usize = 16;
pub const MAX_POWERUPS: usize = 16;
pub const MAX_HOLDABLE: usize = 16;
pub const MAX_WEAPONS: usize = 64;

/// Player movement, view and inventory state.
///
/// Scalar members are delta-coded through [`PLAYER_STATE_TABLE`]; the arrays
/// at the end travel in bitmapped sections after the table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[repr(C)]
pub struct PlayerState {
    pub command_time: i32,
    pub pm_type: i32,
    pub bob_cycle: i32,
    pub pm_flags: i32,
    pub pm_time: i32,

    pub origin: [f32; 3],
    pub velocity: [f32; 3],
    pub weapon_time: i32,
    pub weapon_delay: i32,
    pub grenade_time_left: i32,
    pub gravity: i32,
    pub leanf: f32,
    pub speed: i32,
    pub delta_angles: [i32; 3],

    pub ground_entity_num: i32,
    pub legs_timer: i32,
    pub torso_timer: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub movement_dir: i32,
    pub e_flags: i32,

    pub event_sequence: i32,
    pub events: [i32; 4],
    pub event_parms: [i32; 4],
    pub client_num: i32,

    pub weapons: [i32; 2],
    pub weapon: i32,
    pub weaponstate: i32,
    pub weap_anim: i32,

    pub viewangles: [f32; 3],
    pub viewheight: i32,

    pub damage_event: i32,
    pub damage_yaw: i32,
    pub damage_pitch: i32,
    pub damage_count: i32,

    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub crouch_max_z: f32,
    pub crouch_view_height: f32,
    pub stand_view_height: f32,
    pub dead_view_height: f32,
    pub run_speed_scale: f32,
    pub sprint_speed_scale: f32,
    pub crouch_speed_scale: f32,
    pub friction: f32,

    pub viewlocked: i32,
    pub viewlocked_ent_num: i32,
    pub next_weapon: i32,
    pub team_num: i32,
    pub on_fire_start: i32,
    pub cur_weap_heat: i32,
    pub aim_spread_scale: i32,
    pub server_cursor_hint: i32,
    pub server_cursor_hint_val: i32,
    pub class_weapon_time: i32,
    pub identify_client: i32,
    pub identify_client_health: i32,
    pub ai_state: i32,

    pub stats: [i32; MAX_STATS],
    pub persistant: [i32; MAX_PERSISTANT],
    pub powerups: [i32; MAX_POWERUPS],
    pub holdable: [i32; MAX_HOLDABLE],
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_arrays"))]
    pub ammo: [i32; MAX_WEAPONS],
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_arrays"))]
    pub ammoclip: [i32; MAX_WEAPONS],
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            command_time: 0,
            pm_type: 0,
            bob_cycle: 0,
            pm_flags: 0,
            pm_time: 0,
            origin: [0.0; 3],
            velocity: [0.0; 3],
            weapon_time: 0,
            weapon_delay: 0,
            grenade_time_left: 0,
            gravity: 0,
            leanf: 0.0,
            speed: 0,
            delta_angles: [0; 3],
            ground_entity_num: 0,
            legs_timer: 0,
            torso_timer: 0,
            legs_anim: 0,
            torso_anim: 0,
            movement_dir: 0,
            e_flags: 0,
            event_sequence: 0,
            events: [0; 4],
            event_parms: [0; 4],
            client_num: 0,
            weapons: [0; 2],
            weapon: 0,
            weaponstate: 0,
            weap_anim: 0,
            viewangles: [0.0; 3],
            viewheight: 0,
            damage_event: 0,
            damage_yaw: 0,
            damage_pitch: 0,
            damage_count: 0,
            mins: [0.0; 3],
            maxs: [0.0; 3],
            crouch_max_z: 0.0,
            crouch_view_height: 0.0,
            stand_view_height: 0.0,
            dead_view_height: 0.0,
            run_speed_scale: 0.0,
            sprint_speed_scale: 0.0,
            crouch_speed_scale: 0.0,
            friction: 0.0,
            viewlocked: 0,
            viewlocked_ent_num: 0,
            next_weapon: 0,
            team_num: 0,
            on_fire_start: 0,
            cur_weap_heat: 0,
            aim_spread_scale: 0,
            server_cursor_hint: 0,
            server_cursor_hint_val: 0,
            class_weapon_time: 0,
            identify_client: 0,
            identify_client_health: 0,
            ai_state: 0,
            stats: [0; MAX_STATS],
            persistant: [0; MAX_PERSISTANT],
            powerups: [0; MAX_POWERUPS],
            holdable: [0; MAX_HOLDABLE],
            ammo: [0; MAX_WEAPONS],
            ammoclip: [0; MAX_WEAPONS],
        }
    }
}

macro_rules! ps {
    ($($t:tt)+) => {
        net_field!(PlayerState, $($t)+)
    };
}

/// Player state scalar fields in wire order.
pub static PLAYER_STATE_FIELDS: [NetField<PlayerState>; 77] = [
    ps!("command_time", 32, command_time),
    ps!("pm_type", 8, pm_type),
    ps!("bob_cycle", 8, bob_cycle),
    ps!("pm_flags", 16, pm_flags),
    ps!("pm_time", -16, pm_time),
    ps!("origin[0]", 0, origin[0]),
    ps!("origin[1]", 0, origin[1]),
    ps!("origin[2]", 0, origin[2]),
    ps!("velocity[0]", 0, velocity[0]),
    ps!("velocity[1]", 0, velocity[1]),
    ps!("velocity[2]", 0, velocity[2]),
    ps!("weapon_time", -16, weapon_time),
    ps!("weapon_delay", -16, weapon_delay),
    ps!("grenade_time_left", -16, grenade_time_left),
    ps!("gravity", 16, gravity),
    ps!("leanf", 0, leanf),
    ps!("speed", 16, speed),
    ps!("delta_angles[0]", 16, delta_angles[0]),
    ps!("delta_angles[1]", 16, delta_angles[1]),
    ps!("delta_angles[2]", 16, delta_angles[2]),
    ps!("ground_entity_num", GENTITYNUM_BITS, ground_entity_num),
    ps!("legs_timer", 16, legs_timer),
    ps!("torso_timer", 16, torso_timer),
    ps!("legs_anim", ANIM_BITS, legs_anim),
    ps!("torso_anim", ANIM_BITS, torso_anim),
    ps!("movement_dir", 8, movement_dir),
    ps!("e_flags", 24, e_flags),
    ps!("event_sequence", 8, event_sequence),
    ps!("events[0]", 8, events[0]),
    ps!("events[1]", 8, events[1]),
    ps!("events[2]", 8, events[2]),
    ps!("events[3]", 8, events[3]),
    ps!("event_parms[0]", 8, event_parms[0]),
    ps!("event_parms[1]", 8, event_parms[1]),
    ps!("event_parms[2]", 8, event_parms[2]),
    ps!("event_parms[3]", 8, event_parms[3]),
    ps!("client_num", 8, client_num),
    ps!("weapons[0]", 32, weapons[0]),
    ps!("weapons[1]", 32, weapons[1]),
    ps!("weapon", 7, weapon),
    ps!("weaponstate", 4, weaponstate),
    ps!("weap_anim", 10, weap_anim),
    ps!("viewangles[0]", 0, viewangles[0]),
    ps!("viewangles[1]", 0, viewangles[1]),
    ps!("viewangles[2]", 0, viewangles[2]),
    ps!("viewheight", -8, viewheight),
    ps!("damage_event", 8, damage_event),
    ps!("damage_yaw", 8, damage_yaw),
    ps!("damage_pitch", 8, damage_pitch),
    ps!("damage_count", 8, damage_count),
    ps!("mins[0]", 0, mins[0]),
    ps!("mins[1]", 0, mins[1]),
    ps!("mins[2]", 0, mins[2]),
    ps!("maxs[0]", 0, maxs[0]),
    ps!("maxs[1]", 0, maxs[1]),
    ps!("maxs[2]", 0, maxs[2]),
    ps!("crouch_max_z", 0, crouch_max_z),
    ps!("crouch_view_height", 0, crouch_view_height),
    ps!("stand_view_height", 0, stand_view_height),
    ps!("dead_view_height", 0, dead_view_height),
    ps!("run_speed_scale", 0, run_speed_scale),
    ps!("sprint_speed_scale", 0, sprint_speed_scale),
    ps!("crouch_speed_scale", 0, crouch_speed_scale),
    ps!("friction", 0, friction),
    ps!("viewlocked", 8, viewlocked),
    ps!("viewlocked_ent_num", 16, viewlocked_ent_num),
    ps!("next_weapon", 8, next_weapon),
    ps!("team_num", 8, team_num),
    ps!("on_fire_start", 32, on_fire_start),
    ps!("cur_weap_heat", 8, cur_weap_heat),
    ps!("aim_spread_scale", 8, aim_spread_scale),
    ps!("server_cursor_hint", 8, server_cursor_hint),
    ps!("server_cursor_hint_val", 8, server_cursor_hint_val),
    ps!("class_weapon_time", 32, class_weapon_time),
    ps!("identify_client", 8, identify_client),
    ps!("identify_client_health", 8, identify_client_health),
    ps!("ai_state", 2, ai_state),
];

/// The player state delta table (bare scheme).
pub static PLAYER_STATE_TABLE: FieldTable<PlayerState> =
    FieldTable::new("player_state", FieldScheme::Bare, &PLAYER_STATE_FIELDS);
