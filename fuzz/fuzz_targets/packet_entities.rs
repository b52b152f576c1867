#![no_main]

use bitstream::MsgBuffer;
use codec::{read_packet_entities, Baselines, CodecLimits};
use libfuzzer_sys::fuzz_target;
use schema::EntityState;

fuzz_target!(|data: &[u8]| {
    let limits = CodecLimits::for_testing();
    let baselines = Baselines::new();
    let previous: Vec<EntityState> = (0..8).map(|n| EntityState::with_number(n * 3)).collect();

    let mut bytes = data.to_vec();
    let len = bytes.len();
    let mut msg = MsgBuffer::init(&mut bytes).with_len(len);
    msg.begin_reading();
    if let Ok(entities) = read_packet_entities(&mut msg, &previous, &baselines, &limits) {
        assert!(entities.len() <= limits.max_packet_entities);
        assert!(entities.windows(2).all(|pair| pair[0].number < pair[1].number));
    }
});
