//! Error types for the reader layer.

use meraxes_store::StoreError;

use crate::linkage::LinkKind;

/// Errors that can occur while reading a Meraxes output file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("snapshot {0} not present in file")]
    MissingSnapshot(i64),

    #[error("there are no galaxies in snapshot {0}")]
    EmptySnapshot(u32),

    #[error("unknown galaxy property: {0}")]
    UnknownField(String),

    #[error("no core in snapshot {0} yields a usable record schema")]
    UnresolvableSchema(u32),

    #[error("{kind} link {value} at row {row} rebases outside [0, {limit})")]
    OutOfRangeLink {
        kind: LinkKind,
        row: usize,
        value: i32,
        limit: usize,
    },

    #[error("shards of snapshot {snapshot} hold {got} records but {expected} were declared")]
    ShardCountMismatch {
        snapshot: u32,
        expected: usize,
        got: usize,
    },

    #[error("selection requested {requested} galaxies but snapshot {snapshot} yielded {found}")]
    SelectionOutOfRange {
        snapshot: u32,
        requested: usize,
        found: usize,
    },

    #[error("no {what} within {tol} of {target}")]
    NoMatchWithinTolerance {
        what: &'static str,
        target: f64,
        tol: f64,
    },

    #[error("no dataset `{0}` in file")]
    MissingDataset(String),

    #[error("dataset `{path}` holds {got} values, expected {expected}")]
    BadShape {
        path: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
