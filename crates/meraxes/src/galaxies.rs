//! Galaxy table assembly: reassembling one snapshot's sharded record table
//! into a single contiguous buffer.
//!
//! Each snapshot holds `NCores` shards, `Core{i}/Galaxies`, all sharing one
//! record schema. The assembled table is the concatenation of the shards in
//! ascending core order: core 0's records first, in on-disk order, then
//! core 1's, and so on. A caller may instead request a subset of global
//! record indices, which are translated to per-core local rows and packed
//! densely into the output.

use byteorder::{ByteOrder, LittleEndian};
use meraxes_store::{
    decode_f32_column, decode_f64_column, decode_i32_column, decode_i64_column, RecordSchema,
    Scalar, Selection, StoreError, StoreRead,
};

use crate::context::ReadContext;
use crate::error::{Error, Result};
use crate::shards::{core_count, core_dataset};
use crate::snapshot::{resolve_snapshot, snap_group};
use crate::units::{apply_hubble_scaling, read_units, ScalingWarning};

/// The one record field that references another record of the same
/// snapshot by core-local index, and so must be rebased during assembly.
const CENTRAL_FIELD: &str = "CentralGal";

// ---------------------------------------------------------------------------
// GalaxyTable
// ---------------------------------------------------------------------------

/// An assembled galaxy table: packed little-endian rows plus their schema.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyTable {
    schema: RecordSchema,
    data: Vec<u8>,
    len: usize,
    warnings: Vec<ScalingWarning>,
}

impl GalaxyTable {
    /// Number of galaxy records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// The packed row bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The packed bytes of one record.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        let size = self.schema.record_size();
        if row < self.len {
            Some(&self.data[row * size..(row + 1) * size])
        } else {
            None
        }
    }

    /// Warnings produced while scaling to little-h, if any.
    pub fn warnings(&self) -> &[ScalingWarning] {
        &self.warnings
    }

    /// An `f32` column (vector fields flatten in row order).
    pub fn f32_column(&self, name: &str) -> Result<Vec<f32>> {
        Ok(decode_f32_column(&self.schema, &self.data, name)?)
    }

    /// An `f64` column.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        Ok(decode_f64_column(&self.schema, &self.data, name)?)
    }

    /// An `i32` column.
    pub fn i32_column(&self, name: &str) -> Result<Vec<i32>> {
        Ok(decode_i32_column(&self.schema, &self.data, name)?)
    }

    /// An `i64` column.
    pub fn i64_column(&self, name: &str) -> Result<Vec<i64>> {
        Ok(decode_i64_column(&self.schema, &self.data, name)?)
    }
}

// ---------------------------------------------------------------------------
// read_gals
// ---------------------------------------------------------------------------

/// Read one snapshot's galaxies into an assembled table.
///
/// * `snapshot`: non-negative id, or negative to count back from the last
///   present snapshot (`-1` = last).
/// * `props`: restrict the output schema to the named properties, in the
///   requested order. `None` reads every field.
/// * `indices`: read only the listed global record indices (sorted and
///   deduplicated internally). `None` reads every record.
///
/// Hubble scaling is applied when the context carries a little-h value;
/// properties that cannot be scaled are reported through
/// [`GalaxyTable::warnings`].
pub fn read_gals<S: StoreRead>(
    store: &S,
    ctx: &ReadContext,
    snapshot: i64,
    props: Option<&[&str]>,
    indices: Option<&[usize]>,
) -> Result<GalaxyTable> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let group = snap_group(snapshot);
    tracing::info!(snapshot, "reading snapshot");

    let n_cores = core_count(store)?;
    let file_ngals = store.attr(&group, "NGalaxies")?.expect_usize(&group)?;
    if file_ngals == 0 {
        return Err(Error::EmptySnapshot(snapshot));
    }

    let selection = indices.map(|ix| {
        let mut sorted = ix.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    });
    let ngals = selection.as_ref().map_or(file_ngals, Vec::len);

    let schema = probe_schema(store, snapshot, n_cores, props)?;
    let record_size = schema.record_size();

    let mut data = vec![0u8; ngals * record_size];
    tracing::debug!(
        "allocated {:.1} MB for {} galaxies",
        data.len() as f64 / 1024.0 / 1024.0,
        ngals
    );

    // Offset of the CentralGal field when it survived the schema
    // restriction; its values are core-local and need the core's prefix
    // offset added. A schema without the field is fine.
    let central_offset = schema
        .field(CENTRAL_FIELD)
        .filter(|f| f.scalar == Scalar::I32 && f.count == 1)
        .and_then(|_| schema.offset_of(CENTRAL_FIELD));

    // Output write cursor, in records. In the no-selection path this is
    // also the global offset of the current core's run.
    let mut counter = 0usize;
    // Global records passed over so far, selected or not. Only the
    // selection path distinguishes this from `counter`.
    let mut total_read = 0usize;

    for core in 0..n_cores {
        let path = core_dataset(snapshot, core, "Galaxies");
        let core_ngals = if store.contains(&path) {
            store.dataset_len(&path)?
        } else {
            0
        };

        if core_ngals > 0 {
            match &selection {
                None => {
                    // Shards summing past NGalaxies would overrun the
                    // buffer; surface the mismatch instead.
                    if counter + core_ngals > ngals {
                        return Err(Error::ShardCountMismatch {
                            snapshot,
                            expected: ngals,
                            got: counter + core_ngals,
                        });
                    }
                    let dest = &mut data[counter * record_size..(counter + core_ngals) * record_size];
                    store.read_records_into(&path, &schema, &Selection::All, dest)?;
                    if let Some(offset) = central_offset {
                        rebase_central(dest, record_size, offset, counter as i32);
                    }
                    counter += core_ngals;
                }
                Some(selected) => {
                    let rows: Vec<usize> = selected
                        .iter()
                        .filter(|&&g| g >= total_read && g < total_read + core_ngals)
                        .map(|&g| g - total_read)
                        .collect();
                    if !rows.is_empty() {
                        let found = rows.len();
                        let dest =
                            &mut data[counter * record_size..(counter + found) * record_size];
                        store.read_records_into(&path, &schema, &Selection::Rows(rows), dest)?;
                        if let Some(offset) = central_offset {
                            rebase_central(dest, record_size, offset, total_read as i32);
                        }
                        counter += found;
                    }
                    total_read += core_ngals;
                }
            }
        }

        if counter >= ngals {
            break;
        }
    }

    if counter != ngals {
        return Err(match selection {
            Some(_) => Error::SelectionOutOfRange {
                snapshot,
                requested: ngals,
                found: counter,
            },
            None => Error::ShardCountMismatch {
                snapshot,
                expected: ngals,
                got: counter,
            },
        });
    }
    tracing::info!(read = counter, "read galaxies");

    let mut warnings = Vec::new();
    if let Some(h) = ctx.little_h() {
        let units = read_units(store)?;
        tracing::info!(h, "scaling galaxy properties");
        warnings = apply_hubble_scaling(&schema, &mut data, &units, h);
    }

    Ok(GalaxyTable {
        schema,
        data,
        len: ngals,
        warnings,
    })
}

/// Determine the output schema by probing cores in ascending order until
/// one yields a non-empty record schema; empty cores are uninformative.
fn probe_schema<S: StoreRead>(
    store: &S,
    snapshot: u32,
    n_cores: usize,
    props: Option<&[&str]>,
) -> Result<RecordSchema> {
    for core in 0..n_cores {
        let path = core_dataset(snapshot, core, "Galaxies");
        if !store.contains(&path) || store.dataset_len(&path)? == 0 {
            continue;
        }
        let full = store.record_schema(&path)?;
        if full.is_empty() {
            continue;
        }
        return match props {
            Some(names) => full.restrict(names).map_err(|e| match e {
                StoreError::UnknownField(name) => Error::UnknownField(name),
                other => Error::Store(other),
            }),
            None => Ok(full),
        };
    }
    Err(Error::UnresolvableSchema(snapshot))
}

/// Add `delta` to the CentralGal value of every record in `dest`.
fn rebase_central(dest: &mut [u8], record_size: usize, field_offset: usize, delta: i32) {
    let n_rows = dest.len() / record_size;
    for row in 0..n_rows {
        let at = row * record_size + field_offset;
        let v = LittleEndian::read_i32(&dest[at..at + 4]);
        LittleEndian::write_i32(&mut dest[at..at + 4], v + delta);
    }
}
