//! Field table validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when validating a field table against its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Integer field width is zero or wider than a record word.
    InvalidBitWidth { field: &'static str, bits: i32 },

    /// Two fields in one table share a name.
    DuplicateFieldName { name: &'static str },

    /// The table no longer mirrors the record layout.
    WordCountMismatch {
        table: &'static str,
        fields: usize,
        words: usize,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBitWidth { field, bits } => {
                write!(f, "field {field} has invalid width {bits}")
            }
            Self::DuplicateFieldName { name } => write!(f, "duplicate field name {name}"),
            Self::WordCountMismatch {
                table,
                fields,
                words,
            } => write!(
                f,
                "table {table} has {fields} fields but its record holds {words} words"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}
