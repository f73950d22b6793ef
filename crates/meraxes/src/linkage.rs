//! Merger-tree linkage indices: reading and rebasing.
//!
//! Each core stores its linkage arrays with core-local indices. When the
//! per-core runs are concatenated into one big array (in the same core
//! order the galaxy assembler uses), each core's values must be offset into
//! the coordinate space of the *target* snapshot's assembled table:
//!
//! * first-progenitor links point one snapshot back, so core `i`'s values
//!   get the **previous** snapshot's prefix offset for core `i`;
//! * next-progenitor chains link within the current snapshot, so the
//!   current snapshot's own running offset applies;
//! * descendant links point one snapshot forward, mirroring
//!   first-progenitor with the **next** snapshot's offsets.
//!
//! The reserved no-link sentinel (`-1`) is excluded from the offset add by
//! an explicit mask; adding an offset to `-1` would fabricate a small
//! positive index.

use std::fmt;

use meraxes_store::StoreRead;

use crate::error::{Error, Result};
use crate::shards::{core_count, core_dataset, ShardLayout};
use crate::snapshot::{resolve_snapshot, snap_group};

/// Reserved linkage value meaning "no linked record".
pub const NO_LINK: i32 = -1;

/// Which linkage array to read, and therefore which snapshot the rebased
/// indices point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Points into the previous snapshot's table.
    FirstProgenitor,
    /// Points into the current snapshot's own table.
    NextProgenitor,
    /// Points into the next snapshot's table.
    Descendant,
}

impl LinkKind {
    /// Per-core dataset name within a snapshot group.
    pub fn dataset_name(self) -> &'static str {
        match self {
            LinkKind::FirstProgenitor => "FirstProgenitorIndices",
            LinkKind::NextProgenitor => "NextProgenitorIndices",
            LinkKind::Descendant => "DescendantIndices",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::FirstProgenitor => write!(f, "first-progenitor"),
            LinkKind::NextProgenitor => write!(f, "next-progenitor"),
            LinkKind::Descendant => write!(f, "descendant"),
        }
    }
}

/// Read a snapshot's linkage array, rebased to global indices.
///
/// Non-sentinel values of the result lie in `[0, N)` where `N` is the
/// target snapshot's total record count; the sentinel passes through
/// untouched. The adjacent snapshot must exist for the cross-snapshot
/// kinds: snapshot 0 has no progenitor target and the last snapshot has no
/// descendant target.
pub fn read_linkage<S: StoreRead>(store: &S, snapshot: i64, kind: LinkKind) -> Result<Vec<i32>> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let group = snap_group(snapshot);
    let n_cores = core_count(store)?;
    let n_gals = store.attr(&group, "NGalaxies")?.expect_usize(&group)?;

    // Prefix offsets of the target snapshot's shards. NextProgenitor stays
    // within the current snapshot and offsets by the running counter
    // instead.
    let (target_offsets, target_total) = match kind {
        LinkKind::FirstProgenitor => {
            let prev = snapshot
                .checked_sub(1)
                .ok_or(Error::MissingSnapshot(snapshot as i64 - 1))?;
            let layout = ShardLayout::scan(store, prev, n_cores)?;
            (Some(layout.offsets().to_vec()), layout.total())
        }
        LinkKind::Descendant => {
            let layout = ShardLayout::scan(store, snapshot + 1, n_cores)?;
            (Some(layout.offsets().to_vec()), layout.total())
        }
        LinkKind::NextProgenitor => (None, n_gals),
    };

    let mut indices = vec![0i32; n_gals];
    let mut counter = 0usize;

    for core in 0..n_cores {
        let path = core_dataset(snapshot, core, kind.dataset_name());
        let core_nvals = if store.contains(&path) {
            store.dataset_len(&path)?
        } else {
            0
        };
        if core_nvals == 0 {
            continue;
        }
        if counter + core_nvals > n_gals {
            return Err(Error::ShardCountMismatch {
                snapshot,
                expected: n_gals,
                got: counter + core_nvals,
            });
        }

        let dest = &mut indices[counter..counter + core_nvals];
        store.read_i32_into(&path, dest)?;

        let offset = match &target_offsets {
            Some(offsets) => offsets[core],
            None => counter,
        };
        for (i, value) in dest.iter_mut().enumerate() {
            if *value > NO_LINK {
                let rebased = *value as i64 + offset as i64;
                if rebased < 0 || rebased as usize >= target_total {
                    return Err(Error::OutOfRangeLink {
                        kind,
                        row: counter + i,
                        value: *value,
                        limit: target_total,
                    });
                }
                *value = rebased as i32;
            }
        }
        counter += core_nvals;
    }

    if counter != n_gals {
        return Err(Error::ShardCountMismatch {
            snapshot,
            expected: n_gals,
            got: counter,
        });
    }
    Ok(indices)
}

/// Read the rebased first-progenitor indices of a snapshot.
pub fn read_firstprogenitor_indices<S: StoreRead>(store: &S, snapshot: i64) -> Result<Vec<i32>> {
    read_linkage(store, snapshot, LinkKind::FirstProgenitor)
}

/// Read the rebased next-progenitor indices of a snapshot.
pub fn read_nextprogenitor_indices<S: StoreRead>(store: &S, snapshot: i64) -> Result<Vec<i32>> {
    read_linkage(store, snapshot, LinkKind::NextProgenitor)
}

/// Read the rebased descendant indices of a snapshot.
pub fn read_descendant_indices<S: StoreRead>(store: &S, snapshot: i64) -> Result<Vec<i32>> {
    read_linkage(store, snapshot, LinkKind::Descendant)
}
