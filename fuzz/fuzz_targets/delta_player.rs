#![no_main]

use bitstream::MsgBuffer;
use codec::read_delta_player_state;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut bytes = data.to_vec();
    let len = bytes.len();
    let mut msg = MsgBuffer::init(&mut bytes).with_len(len);
    msg.begin_reading();

    let mut from = None;
    for _ in 0..4 {
        match read_delta_player_state(&mut msg, from.as_ref()) {
            Ok(state) => from = Some(state),
            Err(_) => return,
        }
    }
});
