#![no_main]

use bitstream::{HuffmanCoder, MsgBuffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let mut bytes = payload.to_vec();
    let len = bytes.len();
    let coder = HuffmanCoder::train(payload);
    let mut msg = MsgBuffer::init(&mut bytes).with_len(len).with_coder(&coder);
    if selector & 1 == 0 {
        msg.begin_reading();
    } else {
        msg.begin_reading_oob();
    }

    // Use input bytes to drive a bounded sequence of reads.
    for (idx, op) in payload.iter().take(1024).enumerate() {
        match op % 9 {
            0 => {
                let bits = i32::from(payload[idx / 2] % 65) - 32;
                let _ = msg.read_bits(bits);
            }
            1 => {
                let _ = msg.read_char();
            }
            2 => {
                let _ = msg.read_short();
            }
            3 => {
                let _ = msg.read_long();
            }
            4 => {
                let _ = msg.read_float();
            }
            5 => {
                let _ = msg.read_string();
            }
            6 => {
                let _ = msg.read_string_line();
            }
            7 => {
                let _ = msg.read_angle16();
            }
            _ => msg.begin_reading_uncompressed(),
        }
    }
});
