//! Error types for message buffer operations.
//!
//! Only caller bugs are errors here. Running out of room on write latches the
//! buffer's overflow flag and running out of data on read yields zero; neither
//! is reported through [`BitError`].

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// Bit count is zero or its magnitude exceeds 32.
    InvalidBitCount {
        /// The invalid bit count provided (sign included).
        bits: i32,
    },

    /// Out-of-band mode only moves whole bytes, words and longs.
    UnsupportedRawWidth {
        /// The rejected width in bits.
        bits: u32,
    },

    /// Destination slice cannot hold the message being copied.
    CopyTooSmall {
        /// Bytes the source message occupies.
        needed: usize,
        /// Bytes available in the destination.
        available: usize,
    },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBitCount { bits } => {
                write!(f, "invalid bit count {bits}, expected 1..=32 in magnitude")
            }
            Self::UnsupportedRawWidth { bits } => {
                write!(f, "can't move {bits} bits in out-of-band mode")
            }
            Self::CopyTooSmall { needed, available } => {
                write!(
                    f,
                    "can't copy {needed} bytes into a {available} byte message buffer"
                )
            }
        }
    }
}

impl std::error::Error for BitError {}
