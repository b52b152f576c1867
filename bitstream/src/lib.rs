//! Message buffer and bit packing primitives for the tickwire codec.
//!
//! [`MsgBuffer`] wraps a caller-supplied byte slice and supports two encodings
//! that can be switched within one message:
//!
//! - **in-band**: values are bit-packed LSB-first through an [`EntropyCoder`]
//!   ([`RawCoder`] stores plain bits, [`HuffmanCoder`] applies a static prefix
//!   code to whole bytes);
//! - **out-of-band**: byte aligned, little-endian, widths 8/16/32 only.
//!
//! # Design Principles
//!
//! - **No unsafe code**.
//! - **Bounded operations** - the backing slice is never grown; a write that
//!   does not fit latches the overflow flag instead of panicking.
//! - **Forgiving reads** - reading past the end yields zero, so truncated
//!   packets cannot crash a receiver.
//! - **Explicit errors** - only caller bugs (bad widths) return [`BitError`].
//!
//! # Example
//!
//! ```
//! use bitstream::MsgBuffer;
//!
//! let mut buf = [0u8; 16];
//! let mut msg = MsgBuffer::init(&mut buf);
//! msg.write_bits(1, 1).unwrap();
//! msg.write_bits(-3, -7).unwrap();
//! msg.write_string("hello");
//!
//! msg.begin_reading();
//! assert_eq!(msg.read_bits(1).unwrap(), 1);
//! assert_eq!(msg.read_bits(-7).unwrap(), -3);
//! assert_eq!(msg.read_string(), "hello");
//! ```

mod buffer;
mod entropy;
mod error;
mod huffman;
mod message;

pub use buffer::MsgBuffer;
pub use entropy::{EntropyCoder, RawCoder};
pub use error::{BitError, BitResult};
pub use huffman::HuffmanCoder;
pub use message::{
    angle_to_short, hash_key, short_to_angle, BIG_INFO_STRING, MAX_STRING_CHARS,
};
