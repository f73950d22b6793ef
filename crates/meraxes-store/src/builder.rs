//! Builder for constructing in-memory containers.
//!
//! Mainly used by tests and tools that need to synthesise a model output
//! file without running the model.

use std::collections::BTreeMap;

use crate::attr::AttrValue;
use crate::dataset::{Dataset, RecordBatch};
use crate::store::{DatasetNode, MemStore};

/// Builder for one dataset: payload plus attributes.
pub struct DatasetBuilder {
    path: String,
    data: Dataset,
    attrs: BTreeMap<String, AttrValue>,
}

impl DatasetBuilder {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            data: Dataset::I32(Vec::new()),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_i32_data(&mut self, data: &[i32]) -> &mut Self {
        self.data = Dataset::I32(data.to_vec());
        self
    }

    pub fn with_f32_data(&mut self, data: &[f32]) -> &mut Self {
        self.data = Dataset::F32(data.to_vec());
        self
    }

    pub fn with_f64_data(&mut self, data: &[f64]) -> &mut Self {
        self.data = Dataset::F64(data.to_vec());
        self
    }

    pub fn with_str_data(&mut self, data: &str) -> &mut Self {
        self.data = Dataset::Str(data.to_string());
        self
    }

    pub fn with_records(&mut self, batch: RecordBatch) -> &mut Self {
        self.data = Dataset::Records(batch);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: AttrValue) -> &mut Self {
        self.attrs.insert(name.to_string(), value);
        self
    }
}

/// Builder for a whole in-memory container.
///
/// ```
/// use meraxes_store::{AttrValue, StoreBuilder, StoreRead};
///
/// let mut b = StoreBuilder::new();
/// b.set_attr("NCores", AttrValue::I64Array(vec![2]));
/// b.create_group("Snap042");
/// b.set_group_attr("Snap042", "Redshift", AttrValue::F64Array(vec![5.0]));
/// b.create_dataset("Snap042/Core0/FirstProgenitorIndices")
///     .with_i32_data(&[-1, 0, 2]);
/// let store = b.finish();
/// assert!(store.contains("Snap042/Core0"));
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    group_attrs: BTreeMap<String, BTreeMap<String, AttrValue>>,
    datasets: Vec<DatasetBuilder>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        let mut group_attrs = BTreeMap::new();
        group_attrs.insert(String::new(), BTreeMap::new());
        Self {
            group_attrs,
            datasets: Vec::new(),
        }
    }

    /// Set a root-level attribute.
    pub fn set_attr(&mut self, name: &str, value: AttrValue) -> &mut Self {
        self.set_group_attr("", name, value)
    }

    /// Create a (possibly nested) group.
    pub fn create_group(&mut self, path: &str) -> &mut Self {
        self.group_attrs.entry(path.to_string()).or_default();
        self
    }

    /// Set an attribute on a group, creating the group if needed.
    pub fn set_group_attr(&mut self, path: &str, name: &str, value: AttrValue) -> &mut Self {
        self.group_attrs
            .entry(path.to_string())
            .or_default()
            .insert(name.to_string(), value);
        self
    }

    /// Start a dataset at `path`; parent groups are created on `finish`.
    pub fn create_dataset(&mut self, path: &str) -> &mut DatasetBuilder {
        self.datasets.push(DatasetBuilder::new(path));
        self.datasets.last_mut().unwrap()
    }

    /// Seal the builder into an immutable [`MemStore`].
    pub fn finish(self) -> MemStore {
        let mut group_attrs = self.group_attrs;
        let mut datasets = BTreeMap::new();
        for b in self.datasets {
            datasets.insert(
                b.path.clone(),
                DatasetNode {
                    data: b.data,
                    attrs: b.attrs,
                },
            );
        }
        // Every ancestor of a declared path is itself a group.
        let declared: Vec<String> = group_attrs
            .keys()
            .cloned()
            .chain(datasets.keys().cloned())
            .collect();
        for path in declared {
            let mut at = path.as_str();
            while let Some(idx) = at.rfind('/') {
                at = &at[..idx];
                group_attrs.entry(at.to_string()).or_default();
            }
        }
        group_attrs.entry(String::new()).or_default();
        MemStore {
            group_attrs,
            datasets,
        }
    }
}
