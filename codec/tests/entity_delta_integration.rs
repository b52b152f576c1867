use bitstream::MsgBuffer;
use codec::{
    read_delta_entity, read_entity_number, write_delta_entity, write_delta_entity_observed,
    ChangeStats, FLOAT_INT_BIAS,
};
use schema::{EntityState, ENTITYNUM_NONE, ENTITY_STATE_TABLE};

fn origin_index() -> usize {
    ENTITY_STATE_TABLE.field_index("origin[0]").unwrap()
}

/// Bits written and the resulting message length in bytes.
fn encode(from: Option<&EntityState>, to: &EntityState, buf: &mut [u8]) -> (usize, usize) {
    let mut msg = MsgBuffer::init(buf);
    write_delta_entity(&mut msg, from, Some(to), false).unwrap();
    assert!(!msg.is_overflowed());
    (msg.bits_written(), msg.cursize())
}

fn reader(buf: &mut [u8], len: usize) -> MsgBuffer<'_> {
    let mut msg = MsgBuffer::init(buf).with_len(len);
    msg.begin_reading();
    msg
}

fn decode(buf: &mut [u8], len: usize, from: &EntityState) -> EntityState {
    let mut msg = reader(buf, len);
    let number = read_entity_number(&mut msg).unwrap();
    read_delta_entity(&mut msg, from, number).unwrap()
}

#[test]
fn fractional_origin_goes_out_as_raw_float() {
    let from = EntityState::with_number(5);
    let to = EntityState {
        origin: [17.5, 0.0, 0.0],
        ..from
    };

    let mut buf = [0u8; 64];
    let (bits, len) = encode(Some(&from), &to, &mut buf);
    let lc = origin_index() + 1;
    assert_eq!(lc, 23);
    assert_eq!(bits, 10 + 1 + 1 + 8 + (lc - 1) + 1 + 1 + 1 + 32);

    let mut msg = reader(&mut buf, len);
    assert_eq!(msg.read_bits(10).unwrap(), 5);
    assert_eq!(msg.read_bits(1).unwrap(), 0);
    assert_eq!(msg.read_bits(1).unwrap(), 1);
    assert_eq!(msg.read_byte(), 23);
    for _ in 0..lc - 1 {
        assert_eq!(msg.read_bits(1).unwrap(), 0);
    }
    assert_eq!(msg.read_bits(1).unwrap(), 1, "changed");
    assert_eq!(msg.read_bits(1).unwrap(), 1, "nonzero");
    assert_eq!(msg.read_bits(1).unwrap(), 1, "not a small integer");
    assert_eq!(msg.read_bits(32).unwrap() as u32, 17.5f32.to_bits());

    assert_eq!(decode(&mut buf, len, &from), to);
}

#[test]
fn small_integer_floats_use_thirteen_bits() {
    let from = EntityState::with_number(1);
    for (value, wire) in [(4095.0f32, 8191), (-4096.0, 0), (1.0, 4097)] {
        let to = EntityState {
            origin: [value, 0.0, 0.0],
            ..from
        };
        let mut buf = [0u8; 64];
        let (bits, len) = encode(Some(&from), &to, &mut buf);
        assert_eq!(bits, 10 + 2 + 8 + origin_index() + 3 + 13, "value {value}");

        let mut msg = reader(&mut buf, len);
        msg.read_bits(10 + 2).unwrap();
        msg.read_byte();
        msg.read_bits(origin_index() as i32).unwrap();
        assert_eq!(msg.read_bits(3).unwrap(), 0b011);
        assert_eq!(msg.read_bits(13).unwrap(), wire);
        assert_eq!(wire - FLOAT_INT_BIAS, value as i32);

        assert_eq!(decode(&mut buf, len, &from), to);
    }
}

#[test]
fn out_of_range_integer_float_is_raw() {
    let from = EntityState::with_number(1);
    let to = EntityState {
        origin: [4096.0, -4097.0, 0.0],
        ..from
    };
    let mut buf = [0u8; 64];
    let (bits, len) = encode(Some(&from), &to, &mut buf);
    assert_eq!(bits, 10 + 2 + 8 + origin_index() + 2 * (3 + 32));
    assert_eq!(decode(&mut buf, len, &from), to);
}

#[test]
fn zeroing_a_float_costs_two_bits() {
    let from = EntityState {
        number: 3,
        origin: [12.0, 0.0, 0.0],
        ..EntityState::default()
    };
    let to = EntityState::with_number(3);
    let mut buf = [0u8; 64];
    let (bits, len) = encode(Some(&from), &to, &mut buf);
    assert_eq!(bits, 10 + 2 + 8 + origin_index() + 2);
    assert_eq!(decode(&mut buf, len, &from), to);
}

#[test]
fn negative_zero_decodes_as_positive_zero() {
    let from = EntityState::with_number(3);
    let to = EntityState {
        origin: [-0.0, 0.0, 0.0],
        ..from
    };
    let mut buf = [0u8; 64];
    let (bits, len) = encode(Some(&from), &to, &mut buf);
    assert_eq!(bits, 10 + 2 + 8 + origin_index() + 2);

    let decoded = decode(&mut buf, len, &from);
    assert_eq!(decoded.origin[0].to_bits(), 0.0f32.to_bits());
}

#[test]
fn reading_without_a_length_sees_no_content() {
    let from = EntityState::with_number(5);
    let to = EntityState {
        origin: [17.5, 0.0, 0.0],
        ..from
    };
    let mut buf = [0u8; 64];
    let (_, len) = encode(Some(&from), &to, &mut buf);
    assert!(len > 0);

    let mut msg = reader(&mut buf, 0);
    assert_eq!(msg.read_byte(), -1);
}

#[test]
fn removed_entity_decodes_with_none_number() {
    let from = EntityState {
        number: 42,
        e_type: 2,
        modelindex: 17,
        ..EntityState::default()
    };
    let mut buf = [0u8; 8];
    let len = {
        let mut msg = MsgBuffer::init(&mut buf);
        write_delta_entity(&mut msg, Some(&from), None, false).unwrap();
        msg.cursize()
    };

    let decoded = decode(&mut buf, len, &from);
    assert_eq!(decoded.number, ENTITYNUM_NONE);
    assert_eq!(decoded, EntityState::with_number(ENTITYNUM_NONE));
}

#[test]
fn equal_records_emit_nothing() {
    let state = EntityState {
        number: 900,
        e_flags: 0x00FF_FFFF,
        time: -5,
        angles: [90.0, 180.5, -45.0],
        ..EntityState::default()
    };
    let mut buf = [0u8; 8];
    assert_eq!(encode(Some(&state), &state, &mut buf), (0, 0));
}

#[test]
fn observer_counts_fields_across_deltas() {
    let mut stats = ChangeStats::new();
    let mut buf = [0u8; 64];
    let mut from = EntityState::with_number(8);
    for step in 1..=3 {
        let to = EntityState {
            origin: [step as f32, 0.0, 0.0],
            event: if step == 2 { 5 } else { 0 },
            ..from
        };
        let mut msg = MsgBuffer::init(&mut buf);
        write_delta_entity_observed(&mut msg, Some(&from), Some(&to), false, &mut stats).unwrap();
        from = to;
    }

    let report = stats.report("entity_state");
    let origin = report.iter().find(|row| row.name == "origin[0]").unwrap();
    assert_eq!(origin.count, 3);
    let event = report.iter().find(|row| row.name == "event").unwrap();
    assert_eq!(event.count, 2);
}
