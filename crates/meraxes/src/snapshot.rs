//! Snapshot resolution and the snapshot catalogue.

use meraxes_store::{StoreError, StoreRead};

use crate::context::ReadContext;
use crate::error::{Error, Result};
use crate::grids::{read_global_xh, XhWeight};

/// Group name of a snapshot: fixed-width, zero-padded to three digits.
pub(crate) fn snap_group(snapshot: u32) -> String {
    format!("Snap{snapshot:03}")
}

/// The snapshots present in the file, ascending.
pub fn present_snapshots<S: StoreRead>(store: &S) -> Result<Vec<u32>> {
    let mut snaps = Vec::new();
    for name in store.child_names("")? {
        if let Some(digits) = name.strip_prefix("Snap") {
            if let Ok(snap) = digits.parse::<u32>() {
                snaps.push(snap);
            }
        }
    }
    snaps.sort_unstable();
    Ok(snaps)
}

/// Resolve a possibly-negative snapshot id to a present snapshot.
///
/// Negative ids count back from the last present snapshot (`-1` = last),
/// matching the usual "usually z=0" default of reading the final output.
pub fn resolve_snapshot<S: StoreRead>(store: &S, snapshot: i64) -> Result<u32> {
    if snapshot >= 0 {
        let snap = snapshot as u32;
        if store.contains(&snap_group(snap)) {
            Ok(snap)
        } else {
            Err(Error::MissingSnapshot(snapshot))
        }
    } else {
        let present = present_snapshots(store)?;
        let idx = present.len() as i64 + snapshot;
        if idx < 0 {
            return Err(Error::MissingSnapshot(snapshot));
        }
        present
            .get(idx as usize)
            .copied()
            .ok_or(Error::MissingSnapshot(snapshot))
    }
}

/// The list of available snapshots with their redshifts and light-travel
/// times.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapList {
    pub snapshots: Vec<u32>,
    pub redshifts: Vec<f64>,
    /// Light-travel times (Myr), scaled to the context's little-h when set.
    pub lt_times: Vec<f64>,
}

/// Read the snapshot catalogue: every root group carrying both a `Redshift`
/// and an `LTTime` attribute.
pub fn read_snaplist<S: StoreRead>(store: &S, ctx: &ReadContext) -> Result<SnapList> {
    let mut snapshots = Vec::new();
    let mut redshifts = Vec::new();
    let mut lt_times = Vec::new();

    for name in store.child_names("")? {
        let digits = match name.strip_prefix("Snap") {
            Some(digits) => digits,
            None => continue,
        };
        let snap: u32 = match digits.parse() {
            Ok(snap) => snap,
            Err(_) => continue,
        };
        // Groups without the catalogue attributes are skipped, not errors.
        let redshift = match store.attr(&name, "Redshift") {
            Ok(attr) => attr.expect_f64(&name)?,
            Err(StoreError::MissingAttribute { .. }) => continue,
            Err(e) => return Err(e.into()),
        };
        let lt_time = match store.attr(&name, "LTTime") {
            Ok(attr) => attr.expect_f64(&name)?,
            Err(StoreError::MissingAttribute { .. }) => continue,
            Err(e) => return Err(e.into()),
        };
        snapshots.push(snap);
        redshifts.push(redshift);
        lt_times.push(lt_time);
    }

    if let Some(h) = ctx.little_h() {
        tracing::info!(h, "scaling light-travel times");
        for t in &mut lt_times {
            *t /= h;
        }
    }

    Ok(SnapList {
        snapshots,
        redshifts,
        lt_times,
    })
}

/// Grab the redshift of a single snapshot.
pub fn grab_redshift<S: StoreRead>(store: &S, snapshot: i64) -> Result<f64> {
    let snap = resolve_snapshot(store, snapshot)?;
    let group = snap_group(snap);
    Ok(store.attr(&group, "Redshift")?.expect_f64(&group)?)
}

/// Grab the unsampled snapshot number of a single snapshot.
pub fn grab_unsampled_snapshot<S: StoreRead>(store: &S, snapshot: i64) -> Result<i64> {
    let snap = resolve_snapshot(store, snapshot)?;
    let group = snap_group(snap);
    let attr = store.attr(&group, "UnsampledSnapshot")?;
    attr.as_i64().ok_or_else(|| {
        Error::Store(StoreError::TypeMismatch {
            path: group,
            expected: "i64",
            actual: attr.type_name(),
        })
    })
}

/// Find the snapshot closest to the requested redshift.
///
/// Returns `(snapshot, redshift)`; fails if no snapshot lies within `tol`.
pub fn check_for_redshift<S: StoreRead>(
    store: &S,
    redshift: f64,
    tol: f64,
) -> Result<(u32, f64)> {
    let list = read_snaplist(store, &ReadContext::new())?;
    let mut best: Option<(usize, f64)> = None;
    for (i, &z) in list.redshifts.iter().enumerate() {
        let delta = (z - redshift).abs();
        if best.map_or(true, |(_, d)| delta < d) {
            best = Some((i, delta));
        }
    }
    match best {
        Some((i, delta)) if delta <= tol => Ok((list.snapshots[i], list.redshifts[i])),
        _ => Err(Error::NoMatchWithinTolerance {
            what: "redshift",
            target: redshift,
            tol,
        }),
    }
}

/// Find the snapshot whose global neutral fraction is closest to `xh`.
///
/// Returns `(snapshot, redshift, xh)`; fails if no snapshot lies within
/// `tol`. Snapshots without a recorded neutral fraction are skipped.
pub fn check_for_global_xh<S: StoreRead>(
    store: &S,
    xh: f64,
    tol: f64,
) -> Result<(u32, f64, f64)> {
    let list = read_snaplist(store, &ReadContext::new())?;
    let fractions = read_global_xh(store, &list.snapshots, XhWeight::Volume)?;
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in fractions.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        let delta = (value - xh).abs();
        if best.map_or(true, |(_, d)| delta < d) {
            best = Some((i, delta));
        }
    }
    match best {
        Some((i, delta)) if delta <= tol => {
            Ok((list.snapshots[i], list.redshifts[i], fractions[i]))
        }
        _ => Err(Error::NoMatchWithinTolerance {
            what: "neutral fraction",
            target: xh,
            tol,
        }),
    }
}
