//! Shard location: per-core record counts and prefix offsets.
//!
//! Each snapshot's galaxy table is split across `NCores` sub-groups,
//! `Core{i}/Galaxies`. Reassembly and link rebasing both need the per-core
//! record counts and the exclusive prefix sum of those counts (the offset
//! of each core's run within the concatenated table).

use meraxes_store::StoreRead;

use crate::error::{Error, Result};
use crate::snapshot::snap_group;

/// Path of a per-core dataset within a snapshot group.
pub(crate) fn core_dataset(snapshot: u32, core: usize, name: &str) -> String {
    format!("Snap{snapshot:03}/Core{core}/{name}")
}

/// Number of per-snapshot shards; a file-level attribute.
pub(crate) fn core_count<S: StoreRead>(store: &S) -> Result<usize> {
    Ok(store.attr("", "NCores")?.expect_usize("NCores")?)
}

/// Per-core record counts and prefix offsets for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardLayout {
    sizes: Vec<usize>,
    offsets: Vec<usize>,
    total: usize,
}

impl ShardLayout {
    /// Derive a layout from per-core record counts.
    pub fn from_sizes(sizes: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut total = 0;
        for &size in &sizes {
            offsets.push(total);
            total += size;
        }
        Self {
            sizes,
            offsets,
            total,
        }
    }

    /// Scan a snapshot's cores for their galaxy record counts.
    ///
    /// A core whose `Galaxies` dataset is absent contributes zero records;
    /// only a missing snapshot group is an error.
    pub fn scan<S: StoreRead>(store: &S, snapshot: u32, n_cores: usize) -> Result<Self> {
        if !store.contains(&snap_group(snapshot)) {
            return Err(Error::MissingSnapshot(snapshot as i64));
        }
        let mut sizes = Vec::with_capacity(n_cores);
        for core in 0..n_cores {
            let path = core_dataset(snapshot, core, "Galaxies");
            let size = if store.contains(&path) {
                store.dataset_len(&path)?
            } else {
                0
            };
            sizes.push(size);
        }
        Ok(Self::from_sizes(sizes))
    }

    /// Per-core record counts, ascending core order.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Exclusive prefix sums of the record counts; `offsets()[0] == 0`.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Offset of one core's run within the concatenated table.
    pub fn offset(&self, core: usize) -> usize {
        self.offsets[core]
    }

    /// Total record count across all cores.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_offsets_skip_empty_shards() {
        let layout = ShardLayout::from_sizes(vec![5, 0, 3]);
        assert_eq!(layout.offsets(), &[0, 5, 5]);
        assert_eq!(layout.total(), 8);
    }

    #[test]
    fn empty_layout_is_well_formed() {
        let layout = ShardLayout::from_sizes(Vec::new());
        assert_eq!(layout.total(), 0);
        assert!(layout.offsets().is_empty());
    }
}
