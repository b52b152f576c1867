//! Field descriptors: how one record word is read, written and encoded.

use std::fmt;

/// The encoding class of a record word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    /// IEEE-754 single, sent with the truncated-integer shortcut when possible.
    Float,

    /// Unsigned integer in `bits` bits.
    Int { bits: u8 },

    /// Integer in `bits` bits, sign-extended when read back.
    SignedInt { bits: u8 },
}

impl FieldKind {
    /// Maps a legacy width (`0` float, negative signed) to a kind.
    #[must_use]
    pub const fn from_legacy(bits: i32) -> Self {
        if bits == 0 {
            Self::Float
        } else if bits < 0 {
            Self::SignedInt {
                bits: bits.unsigned_abs() as u8,
            }
        } else {
            Self::Int { bits: bits as u8 }
        }
    }

    /// The width handed to the bit writer: `0` for floats, negative for
    /// signed integers.
    #[must_use]
    pub const fn wire_bits(self) -> i32 {
        match self {
            Self::Float => 0,
            Self::Int { bits } => bits as i32,
            Self::SignedInt { bits } => -(bits as i32),
        }
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float)
    }
}

/// One entry in a field table.
///
/// `get` returns the raw 32-bit word (integer bits, or the IEEE-754 pattern
/// for floats) and `set` stores one back. Change detection compares these
/// words, so `-0.0` and `0.0` count as different values.
pub struct NetField<R> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub get: fn(&R) -> u32,
    pub set: fn(&mut R, u32),
}

impl<R> NetField<R> {
    /// Reads this field's word from `record`.
    #[inline]
    pub fn word(&self, record: &R) -> u32 {
        (self.get)(record)
    }

    /// Stores `word` into this field of `record`.
    #[inline]
    pub fn store(&self, record: &mut R, word: u32) {
        (self.set)(record, word);
    }

    /// Copies this field from `src` into `dst`.
    #[inline]
    pub fn copy(&self, src: &R, dst: &mut R) {
        (self.set)(dst, (self.get)(src));
    }
}

impl<R> Clone for NetField<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for NetField<R> {}

impl<R> fmt::Debug for NetField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Declares a [`NetField`] over a record field path.
///
/// A width of `0` marks an `f32` field; any other width an `i32` field.
macro_rules! net_field {
    ($rec:ty, $name:literal, 0, $($path:tt)+) => {
        $crate::field::NetField::<$rec> {
            name: $name,
            kind: $crate::field::FieldKind::Float,
            get: |r: &$rec| r.$($path)+.to_bits(),
            set: |r: &mut $rec, w: u32| r.$($path)+ = f32::from_bits(w),
        }
    };
    ($rec:ty, $name:literal, $bits:expr, $($path:tt)+) => {
        $crate::field::NetField::<$rec> {
            name: $name,
            kind: $crate::field::FieldKind::from_legacy($bits),
            get: |r: &$rec| r.$($path)+ as u32,
            set: |r: &mut $rec, w: u32| r.$($path)+ = w as i32,
        }
    };
}

pub(crate) use net_field;
