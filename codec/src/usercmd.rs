//! Input command deltas.

use bitstream::{EntropyCoder, MsgBuffer};
use schema::UserCmd;

use crate::error::CodecResult;
use crate::keyed::{read_delta_key, write_delta_key};

/// Writes `to` as a delta against `from`, keyed by `key ^ to.server_time`.
///
/// The server time goes out as an 8-bit offset when it is less than 256 ticks
/// ahead of `from`, otherwise as a full 32-bit value. A single bit then says
/// whether any input changed at all.
pub fn write_delta_usercmd_key<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    key: i32,
    from: &UserCmd,
    to: &UserCmd,
) -> CodecResult<()> {
    let offset = to.server_time.wrapping_sub(from.server_time);
    if (offset as u32) < 256 {
        msg.write_bits(1, 1)?;
        msg.write_bits(offset, 8)?;
    } else {
        msg.write_bits(0, 1)?;
        msg.write_bits(to.server_time, 32)?;
    }

    if from.same_input(to) {
        msg.write_bits(0, 1)?;
        return Ok(());
    }

    let key = key ^ to.server_time;
    msg.write_bits(1, 1)?;
    for (old, new) in from.angles.iter().zip(&to.angles) {
        write_delta_key(msg, key, *old, *new, 16)?;
    }
    write_delta_key(msg, key, from.forwardmove.into(), to.forwardmove.into(), 8)?;
    write_delta_key(msg, key, from.rightmove.into(), to.rightmove.into(), 8)?;
    write_delta_key(msg, key, from.upmove.into(), to.upmove.into(), 8)?;
    write_delta_key(msg, key, from.buttons.into(), to.buttons.into(), 8)?;
    write_delta_key(msg, key, from.wbuttons.into(), to.wbuttons.into(), 8)?;
    write_delta_key(msg, key, from.weapon.into(), to.weapon.into(), 8)?;
    write_delta_key(msg, key, from.flags.into(), to.flags.into(), 8)?;
    write_delta_key(msg, key, from.double_tap.into(), to.double_tap.into(), 3)?;
    write_delta_key(msg, key, from.ident_client.into(), to.ident_client.into(), 8)?;
    Ok(())
}

/// Reads a command written by [`write_delta_usercmd_key`].
///
/// Movement axes that decode to -128 are clamped to -127 so the range stays
/// symmetric.
pub fn read_delta_usercmd_key<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    key: i32,
    from: &UserCmd,
) -> CodecResult<UserCmd> {
    let mut to = *from;
    to.server_time = if msg.read_bits(1)? == 1 {
        from.server_time.wrapping_add(msg.read_bits(8)?)
    } else {
        msg.read_bits(32)?
    };

    if msg.read_bits(1)? == 0 {
        return Ok(to);
    }

    let key = key ^ to.server_time;
    for (angle, old) in to.angles.iter_mut().zip(&from.angles) {
        *angle = read_delta_key(msg, key, *old, 16)?;
    }
    to.forwardmove = read_axis(msg, key, from.forwardmove)?;
    to.rightmove = read_axis(msg, key, from.rightmove)?;
    to.upmove = read_axis(msg, key, from.upmove)?;
    to.buttons = read_delta_key(msg, key, from.buttons.into(), 8)? as u8;
    to.wbuttons = read_delta_key(msg, key, from.wbuttons.into(), 8)? as u8;
    to.weapon = read_delta_key(msg, key, from.weapon.into(), 8)? as u8;
    to.flags = read_delta_key(msg, key, from.flags.into(), 8)? as u8;
    to.double_tap = (read_delta_key(msg, key, from.double_tap.into(), 3)? & 0x7) as u8;
    to.ident_client = read_delta_key(msg, key, from.ident_client.into(), 8)? as u8;
    Ok(to)
}

/// Unkeyed variant of [`write_delta_usercmd_key`].
pub fn write_delta_usercmd<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: &UserCmd,
    to: &UserCmd,
) -> CodecResult<()> {
    write_delta_usercmd_key(msg, 0, from, to)
}

/// Unkeyed variant of [`read_delta_usercmd_key`].
pub fn read_delta_usercmd<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    from: &UserCmd,
) -> CodecResult<UserCmd> {
    read_delta_usercmd_key(msg, 0, from)
}

fn read_axis<C: EntropyCoder>(msg: &mut MsgBuffer<'_, C>, key: i32, old: i8) -> CodecResult<i8> {
    let value = read_delta_key(msg, key, old.into(), 8)? as i8;
    Ok(value.max(-127))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(key: i32, from: &UserCmd, to: &UserCmd) -> (UserCmd, usize) {
        let mut buf = [0u8; 64];
        let mut msg = MsgBuffer::init(&mut buf);
        write_delta_usercmd_key(&mut msg, key, from, to).unwrap();
        let bits = msg.bits_written();
        msg.begin_reading();
        (read_delta_usercmd_key(&mut msg, key, from).unwrap(), bits)
    }

    #[test]
    fn idle_command_is_ten_bits() {
        let from = UserCmd {
            server_time: 1000,
            ..UserCmd::default()
        };
        let to = UserCmd {
            server_time: 1050,
            ..from
        };
        let (decoded, bits) = roundtrip(0, &from, &to);
        assert_eq!(decoded, to);
        assert_eq!(bits, 1 + 8 + 1);
    }

    #[test]
    fn large_time_jump_uses_absolute_time() {
        let from = UserCmd {
            server_time: 1000,
            ..UserCmd::default()
        };
        let backwards = UserCmd {
            server_time: 999,
            ..from
        };
        let (decoded, bits) = roundtrip(0, &from, &backwards);
        assert_eq!(decoded.server_time, 999);
        assert_eq!(bits, 1 + 32 + 1);

        let ahead = UserCmd {
            server_time: 1256,
            ..from
        };
        let (decoded, bits) = roundtrip(0, &from, &ahead);
        assert_eq!(decoded.server_time, 1256);
        assert_eq!(bits, 1 + 32 + 1);
    }

    #[test]
    fn all_fields_roundtrip_with_key() {
        let from = UserCmd {
            server_time: 5000,
            ..UserCmd::default()
        };
        let to = UserCmd {
            server_time: 5016,
            angles: [1, 32768, 65535],
            forwardmove: 127,
            rightmove: -127,
            upmove: -5,
            buttons: 0x81,
            wbuttons: 3,
            weapon: 12,
            flags: 0xFF,
            double_tap: 5,
            ident_client: 63,
        };
        let (decoded, _) = roundtrip(0x7ACE_1234, &from, &to);
        assert_eq!(decoded, to);
    }

    #[test]
    fn wrong_key_garbles_changed_fields() {
        let from = UserCmd::default();
        let to = UserCmd {
            server_time: 10,
            buttons: 1,
            ..from
        };
        let mut buf = [0u8; 64];
        let mut msg = MsgBuffer::init(&mut buf);
        write_delta_usercmd_key(&mut msg, 0x55, &from, &to).unwrap();
        msg.begin_reading();
        let decoded = read_delta_usercmd_key(&mut msg, 0x0F, &from).unwrap();
        assert_eq!(decoded.server_time, 10);
        assert_ne!(decoded.buttons, 1);
    }

    #[test]
    fn minus_128_axis_reads_as_minus_127() {
        let from = UserCmd::default();
        let to = UserCmd {
            server_time: 1,
            forwardmove: -128,
            upmove: -128,
            ..from
        };
        let (decoded, _) = roundtrip(0, &from, &to);
        assert_eq!(decoded.forwardmove, -127);
        assert_eq!(decoded.upmove, -127);
        assert_eq!(decoded.rightmove, 0);
    }

    #[test]
    fn double_tap_keeps_three_bits() {
        let from = UserCmd::default();
        let to = UserCmd {
            server_time: 1,
            double_tap: 0x0F,
            ..from
        };
        let (decoded, _) = roundtrip(-1, &from, &to);
        assert_eq!(decoded.double_tap, 0x07);
    }

    #[test]
    fn angles_keep_sixteen_bits() {
        let from = UserCmd::default();
        let to = UserCmd {
            server_time: 1,
            angles: [-1, 0x1_0005, 0],
            ..from
        };
        let (decoded, _) = roundtrip(0, &from, &to);
        assert_eq!(decoded.angles, [0xFFFF, 5, 0]);
    }
}
