//! Record layouts and field descriptor tables for the tickwire codec.
//!
//! This crate defines what gets delta-coded:
//! - Fixed-layout records ([`EntityState`], [`PlayerState`], [`UserCmd`])
//! - Ordered field tables naming each word, its width and its encoding class
//! - Deterministic table fingerprints
//!
//! # Design Principles
//!
//! - **Pinned order** - tables are static data; the delta format depends on
//!   field order and widths, so nothing is derived at runtime.
//! - **No reflection** - each field is an explicit getter/setter pair over a
//!   raw 32-bit word.
//! - **Checked drift** - [`FieldTable::validate`] catches a table that no
//!   longer mirrors its record.

mod entity;
mod error;
mod field;
mod hash;
mod player;
#[cfg(feature = "serde")]
mod serde_arrays;
mod table;
mod usercmd;

pub use entity::{
    EntityState, Trajectory, ANIM_BITS, ENTITYNUM_NONE, ENTITY_STATE_FIELDS, ENTITY_STATE_TABLE,
    GENTITYNUM_BITS, MAX_GENTITIES,
};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldKind, NetField};
pub use hash::table_hash;
pub use player::{
    PlayerState, MAX_HOLDABLE, MAX_PERSISTANT, MAX_POWERUPS, MAX_STATS, MAX_WEAPONS,
    PLAYER_STATE_FIELDS, PLAYER_STATE_TABLE,
};
pub use table::{FieldScheme, FieldTable};
pub use usercmd::UserCmd;
