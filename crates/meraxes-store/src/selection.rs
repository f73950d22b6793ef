//! Row selection for partial dataset reads.

/// A selection describing which rows of a record dataset to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every row, in on-disk order.
    All,
    /// The listed rows, in the listed order.
    Rows(Vec<usize>),
}

impl Selection {
    /// Number of rows the selection yields for a dataset of `len` rows.
    pub fn num_rows(&self, len: usize) -> usize {
        match self {
            Selection::All => len,
            Selection::Rows(rows) => rows.len(),
        }
    }
}
