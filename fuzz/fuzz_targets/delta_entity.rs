#![no_main]

use bitstream::MsgBuffer;
use codec::{read_delta_entity, read_entity_number};
use libfuzzer_sys::fuzz_target;
use schema::EntityState;

fuzz_target!(|data: &[u8]| {
    let mut bytes = data.to_vec();
    let len = bytes.len();
    let mut msg = MsgBuffer::init(&mut bytes).with_len(len);
    msg.begin_reading();

    let mut from = EntityState::default();
    for _ in 0..16 {
        let Ok(number) = read_entity_number(&mut msg) else {
            return;
        };
        match read_delta_entity(&mut msg, &from, number) {
            Ok(state) => from = state,
            Err(_) => return,
        }
    }
});
