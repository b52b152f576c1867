//! Ordered field tables.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldKind, NetField};

/// How a changed field is framed on the wire.
///
/// The two conventions are historical and both must be reproduced exactly:
///
/// - `Guarded` (entity state): every changed field starts with a zero bit;
///   a clear bit means the value is zero and nothing else follows.
/// - `Bare` (player state): floats go straight to the small-integer bit and
///   integers are written raw in their declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldScheme {
    Guarded,
    Bare,
}

/// A pinned, ordered list of the delta-coded words of record type `R`.
///
/// Order matters: the delta writer sends the longest prefix of the table that
/// ends in a changed field, so fields that change often belong near the front.
#[derive(Debug)]
pub struct FieldTable<R: 'static> {
    pub name: &'static str,
    pub scheme: FieldScheme,
    pub fields: &'static [NetField<R>],
    /// Total 4-byte words of `R` when every word but the leading number is
    /// in the table.
    pub record_words: Option<usize>,
}

impl<R: 'static> FieldTable<R> {
    #[must_use]
    pub const fn new(
        name: &'static str,
        scheme: FieldScheme,
        fields: &'static [NetField<R>],
    ) -> Self {
        Self {
            name,
            scheme,
            fields,
            record_words: None,
        }
    }

    /// Declares that the table covers all words of `R` except the number.
    #[must_use]
    pub const fn mirrors_record(mut self) -> Self {
        self.record_words = Some(std::mem::size_of::<R>() / 4);
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the position of the field called `name`.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Checks widths, names and the record word count.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut names = HashSet::new();
        for field in self.fields {
            if !names.insert(field.name) {
                return Err(SchemaError::DuplicateFieldName { name: field.name });
            }
            match field.kind {
                FieldKind::Float => {}
                FieldKind::Int { bits } | FieldKind::SignedInt { bits } => {
                    if bits == 0 || bits > 32 {
                        return Err(SchemaError::InvalidBitWidth {
                            field: field.name,
                            bits: field.kind.wire_bits(),
                        });
                    }
                }
            }
        }

        if let Some(words) = self.record_words {
            if self.fields.len() + 1 != words {
                return Err(SchemaError::WordCountMismatch {
                    table: self.name,
                    fields: self.fields.len(),
                    words,
                });
            }
        }
        Ok(())
    }
}
