//! Error types for the storage layer.

use std::fmt;

/// Errors that can occur when accessing a hierarchical container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No group or dataset exists at the given path.
    NotFound(String),
    /// The object at the given path is not a dataset.
    NotADataset(String),
    /// The named attribute does not exist on the given object.
    MissingAttribute {
        /// Path of the group or dataset that was probed.
        path: String,
        /// Name of the missing attribute.
        name: String,
    },
    /// A dataset or attribute was read with the wrong type accessor.
    TypeMismatch {
        /// Path of the offending object.
        path: String,
        /// The type that was requested.
        expected: &'static str,
        /// The type actually stored.
        actual: &'static str,
    },
    /// A record row index is outside the dataset.
    RowOutOfBounds {
        /// Path of the record dataset.
        path: String,
        /// The offending row index.
        row: usize,
        /// Number of rows in the dataset.
        len: usize,
    },
    /// A requested field name is not part of the record schema.
    UnknownField(String),
    /// A row's values do not match the record schema.
    SchemaMismatch(String),
    /// The destination buffer is too small for the requested read.
    DestinationTooSmall {
        /// Number of bytes (or elements) required.
        needed: usize,
        /// Number of bytes (or elements) available.
        available: usize,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(path) => write!(f, "no such group or dataset: {path}"),
            StoreError::NotADataset(path) => write!(f, "not a dataset: {path}"),
            StoreError::MissingAttribute { path, name } => {
                write!(f, "missing attribute `{name}` on {path}")
            }
            StoreError::TypeMismatch {
                path,
                expected,
                actual,
            } => {
                write!(f, "type mismatch at {path}: requested {expected}, stored {actual}")
            }
            StoreError::RowOutOfBounds { path, row, len } => {
                write!(f, "row {row} out of bounds for {path} ({len} rows)")
            }
            StoreError::UnknownField(name) => write!(f, "unknown record field: {name}"),
            StoreError::SchemaMismatch(why) => write!(f, "record does not match schema: {why}"),
            StoreError::DestinationTooSmall { needed, available } => {
                write!(f, "destination too small: need {needed}, have {available}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
