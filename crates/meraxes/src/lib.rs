//! Reader for Meraxes galaxy-formation model output.
//!
//! A Meraxes master file is hierarchical: one group per snapshot, each
//! sharded into `NCores` per-core sub-groups holding a slice of the galaxy
//! record table and the merger-tree linkage arrays. This crate reassembles
//! those shards into flat, analysis-ready structures:
//!
//! * [`read_gals`] concatenates the per-core galaxy tables (or gathers a
//!   requested index subset) into one [`GalaxyTable`];
//! * [`read_linkage`] and its three wrappers concatenate the linkage arrays
//!   and rebase their core-local indices into whole-snapshot coordinates,
//!   preserving the `-1` no-link sentinel;
//! * the rest of the surface (snapshot catalogue, units, input parameters,
//!   reionization grids and spectra) composes around those two.
//!
//! File access goes through the [`StoreRead`] capability from
//! [`meraxes_store`]; reads are single-shot and the source is treated as
//! immutable.
//!
//! ```
//! use meraxes::{read_gals, ReadContext};
//! use meraxes_store::{
//!     AttrValue, Field, RecordBatch, RecordSchema, Scalar, StoreBuilder, Value,
//! };
//!
//! let schema = RecordSchema::new(vec![Field::scalar("StellarMass", Scalar::F32)]);
//! let mut batch = RecordBatch::new(schema);
//! batch.push_row(&[Value::F32(1.5)]).unwrap();
//!
//! let mut b = StoreBuilder::new();
//! b.set_attr("NCores", AttrValue::I64Array(vec![1]));
//! b.set_group_attr("Snap000", "NGalaxies", AttrValue::I64Array(vec![1]));
//! b.create_dataset("Snap000/Core0/Galaxies").with_records(batch);
//! let store = b.finish();
//!
//! let gals = read_gals(&store, &ReadContext::new(), 0, None, None).unwrap();
//! assert_eq!(gals.f32_column("StellarMass").unwrap(), vec![1.5]);
//! ```

pub mod context;
pub mod error;
pub mod galaxies;
pub mod grids;
pub mod linkage;
pub mod params;
pub mod shards;
pub mod snapshot;
pub mod units;

pub use context::ReadContext;
pub use error::{Error, Result};
pub use galaxies::{read_gals, GalaxyTable};
pub use grids::{
    list_grids, read_global_xh, read_grid, read_ps, read_size_dist, Grid, PowerSpectrum,
    SizeDist, XhWeight,
};
pub use linkage::{
    read_descendant_indices, read_firstprogenitor_indices, read_linkage,
    read_nextprogenitor_indices, LinkKind, NO_LINK,
};
pub use params::{read_git_info, read_input_params, GitInfo, InputParams};
pub use shards::ShardLayout;
pub use snapshot::{
    check_for_global_xh, check_for_redshift, grab_redshift, grab_unsampled_snapshot,
    present_snapshots, read_snaplist, resolve_snapshot, SnapList,
};
pub use units::{read_units, HubbleConversion, ScalingWarning, Units};

// Re-export the storage capability so callers need only one import.
pub use meraxes_store::StoreRead;
