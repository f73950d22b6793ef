//! The read-only container capability and its in-memory implementation.

use std::collections::{BTreeMap, BTreeSet};

use crate::attr::AttrValue;
use crate::dataset::Dataset;
use crate::error::{Result, StoreError};
use crate::schema::RecordSchema;
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// StoreRead: the backend capability
// ---------------------------------------------------------------------------

/// Read-only access to a hierarchical container of groups, attributes, and
/// datasets.
///
/// Paths use `/` separators, with `""` naming the root group. The reader
/// layer is written against this trait; [`MemStore`] is the in-memory
/// implementation shipped with the crate and an on-disk backend can
/// implement the same surface externally.
pub trait StoreRead {
    /// Whether a group or dataset exists at `path`.
    fn contains(&self, path: &str) -> bool;

    /// Names of the immediate children of the group at `path`, sorted.
    fn child_names(&self, path: &str) -> Result<Vec<String>>;

    /// An attribute of the group or dataset at `path`.
    fn attr(&self, path: &str, name: &str) -> Result<AttrValue>;

    /// Names of the attributes attached to the object at `path`, sorted.
    fn attr_names(&self, path: &str) -> Result<Vec<String>>;

    /// Number of elements (rows) in the dataset at `path`.
    fn dataset_len(&self, path: &str) -> Result<usize>;

    /// The record schema of the compound dataset at `path`.
    fn record_schema(&self, path: &str) -> Result<RecordSchema>;

    /// Read an `i32` dataset into the front of `dest`, returning the number
    /// of elements written.
    fn read_i32_into(&self, path: &str, dest: &mut [i32]) -> Result<usize>;

    /// Read an `f32` dataset.
    fn read_f32(&self, path: &str) -> Result<Vec<f32>>;

    /// Read an `f64` dataset.
    fn read_f64(&self, path: &str) -> Result<Vec<f64>>;

    /// Read a string dataset.
    fn read_str(&self, path: &str) -> Result<String>;

    /// Read the selected rows of a compound dataset, gathering the fields of
    /// `schema` into the front of `dest` (packed little-endian rows).
    /// Returns the number of rows written.
    fn read_records_into(
        &self,
        path: &str,
        schema: &RecordSchema,
        selection: &Selection,
        dest: &mut [u8],
    ) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

pub(crate) struct DatasetNode {
    pub(crate) data: Dataset,
    pub(crate) attrs: BTreeMap<String, AttrValue>,
}

/// An immutable in-memory container.
///
/// Built through [`StoreBuilder`](crate::StoreBuilder); read through
/// [`StoreRead`].
pub struct MemStore {
    pub(crate) group_attrs: BTreeMap<String, BTreeMap<String, AttrValue>>,
    pub(crate) datasets: BTreeMap<String, DatasetNode>,
}

impl MemStore {
    fn dataset(&self, path: &str) -> Result<&DatasetNode> {
        match self.datasets.get(path) {
            Some(node) => Ok(node),
            None if self.group_attrs.contains_key(path) => {
                Err(StoreError::NotADataset(path.to_string()))
            }
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn type_mismatch(path: &str, expected: &'static str, node: &DatasetNode) -> StoreError {
        StoreError::TypeMismatch {
            path: path.to_string(),
            expected,
            actual: node.data.type_name(),
        }
    }
}

impl StoreRead for MemStore {
    fn contains(&self, path: &str) -> bool {
        self.group_attrs.contains_key(path) || self.datasets.contains_key(path)
    }

    fn child_names(&self, path: &str) -> Result<Vec<String>> {
        if !self.group_attrs.contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut names = BTreeSet::new();
        for key in self.group_attrs.keys().chain(self.datasets.keys()) {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if rest.is_empty() {
                    continue;
                }
                let first = rest.split('/').next().unwrap_or(rest);
                names.insert(first.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    fn attr(&self, path: &str, name: &str) -> Result<AttrValue> {
        let attrs = if let Some(node) = self.datasets.get(path) {
            &node.attrs
        } else if let Some(attrs) = self.group_attrs.get(path) {
            attrs
        } else {
            return Err(StoreError::NotFound(path.to_string()));
        };
        attrs
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::MissingAttribute {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    fn attr_names(&self, path: &str) -> Result<Vec<String>> {
        let attrs = if let Some(node) = self.datasets.get(path) {
            &node.attrs
        } else if let Some(attrs) = self.group_attrs.get(path) {
            attrs
        } else {
            return Err(StoreError::NotFound(path.to_string()));
        };
        Ok(attrs.keys().cloned().collect())
    }

    fn dataset_len(&self, path: &str) -> Result<usize> {
        Ok(self.dataset(path)?.data.len())
    }

    fn record_schema(&self, path: &str) -> Result<RecordSchema> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::Records(batch) => Ok(batch.schema().clone()),
            _ => Err(Self::type_mismatch(path, "records", node)),
        }
    }

    fn read_i32_into(&self, path: &str, dest: &mut [i32]) -> Result<usize> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::I32(vs) => {
                if dest.len() < vs.len() {
                    return Err(StoreError::DestinationTooSmall {
                        needed: vs.len(),
                        available: dest.len(),
                    });
                }
                dest[..vs.len()].copy_from_slice(vs);
                Ok(vs.len())
            }
            _ => Err(Self::type_mismatch(path, "i32[]", node)),
        }
    }

    fn read_f32(&self, path: &str) -> Result<Vec<f32>> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::F32(vs) => Ok(vs.clone()),
            _ => Err(Self::type_mismatch(path, "f32[]", node)),
        }
    }

    fn read_f64(&self, path: &str) -> Result<Vec<f64>> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::F64(vs) => Ok(vs.clone()),
            // Widening from f32 storage is fine for analysis reads.
            Dataset::F32(vs) => Ok(vs.iter().map(|&v| v as f64).collect()),
            _ => Err(Self::type_mismatch(path, "f64[]", node)),
        }
    }

    fn read_str(&self, path: &str) -> Result<String> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::Str(s) => Ok(s.clone()),
            _ => Err(Self::type_mismatch(path, "string", node)),
        }
    }

    fn read_records_into(
        &self,
        path: &str,
        schema: &RecordSchema,
        selection: &Selection,
        dest: &mut [u8],
    ) -> Result<usize> {
        let node = self.dataset(path)?;
        match &node.data {
            Dataset::Records(batch) => batch.gather_into(path, schema, selection, dest),
            _ => Err(Self::type_mismatch(path, "records", node)),
        }
    }
}
