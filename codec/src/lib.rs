//! Delta coding of game state over a [`bitstream::MsgBuffer`].
//!
//! This crate ties the bit buffer to the field tables in `schema`:
//!
//! - Keyed scalar deltas and user command deltas
//! - The field-table engine used by entity and player state
//! - Bitmapped array sections for player inventories
//! - Sorted entity lists with baselines and removals
//!
//! # Design Principles
//!
//! - **Wire compatible** - every bit is placed where legacy peers expect it.
//! - **Errors are fatal, truncation is not** - short input reads as zeros;
//!   only protocol violations return [`CodecError`].
//! - **Caller buffers** - nothing allocates on the encode path except the
//!   ammo group list.

mod arrays;
mod entity;
mod error;
mod fields;
mod keyed;
mod limits;
mod observer;
mod packet;
mod player;
mod usercmd;

pub use arrays::{read_section, write_section, Group, SlotWidth};
pub use entity::{
    read_delta_entity, read_entity_number, write_delta_entity, write_delta_entity_observed,
};
pub use error::{CodecError, CodecResult, LimitKind};
pub use fields::{
    changed_prefix_len, read_field_delta, write_field_delta, FLOAT_INT_BIAS, FLOAT_INT_BITS,
};
pub use keyed::{read_delta, read_delta_key, write_delta, write_delta_key};
pub use limits::CodecLimits;
pub use observer::{ChangeStats, DeltaObserver, FieldCount, NoopObserver};
pub use packet::{read_packet_entities, write_packet_entities, Baselines};
pub use player::{
    read_delta_player_state, write_delta_player_state, write_delta_player_state_observed,
};
pub use usercmd::{
    read_delta_usercmd, read_delta_usercmd_key, write_delta_usercmd, write_delta_usercmd_key,
};

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::MsgBuffer;
    use schema::{EntityState, PlayerState, UserCmd};

    #[test]
    fn public_api_exports() {
        let _ = CodecLimits::default();
        let _ = Baselines::new();
        let _ = ChangeStats::new();
        let _: CodecResult<()> = Ok(());
        assert_eq!(FLOAT_INT_BIAS, 4096);
        assert_eq!(FLOAT_INT_BITS, 13);
    }

    #[test]
    fn one_message_carries_every_kind() {
        let cmd = UserCmd {
            server_time: 40,
            buttons: 1,
            ..UserCmd::default()
        };
        let player = PlayerState {
            command_time: 40,
            ..PlayerState::default()
        };
        let ent = EntityState {
            number: 12,
            e_type: 1,
            ..EntityState::default()
        };

        let mut buf = [0u8; 256];
        let mut msg = MsgBuffer::init(&mut buf);
        write_delta_usercmd_key(&mut msg, 99, &UserCmd::default(), &cmd).unwrap();
        write_delta_player_state(&mut msg, None, &player).unwrap();
        write_packet_entities(&mut msg, &[], &[ent], &Baselines::new()).unwrap();
        assert!(!msg.is_overflowed());

        msg.begin_reading();
        assert_eq!(
            read_delta_usercmd_key(&mut msg, 99, &UserCmd::default()).unwrap(),
            cmd
        );
        assert_eq!(read_delta_player_state(&mut msg, None).unwrap(), player);
        let entities =
            read_packet_entities(&mut msg, &[], &Baselines::new(), &CodecLimits::default())
                .unwrap();
        assert_eq!(entities, vec![ent]);
    }
}
