//! Reionization grids, power spectra, and region size distributions.

use meraxes_store::{StoreError, StoreRead};

use crate::context::ReadContext;
use crate::error::{Error, Result};
use crate::snapshot::{resolve_snapshot, snap_group};
use crate::units::{read_units, HubbleConversion, ScalingWarning};

// ---------------------------------------------------------------------------
// Grids
// ---------------------------------------------------------------------------

/// A cubic reionization grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dim: usize,
    data: Vec<f32>,
    warning: Option<ScalingWarning>,
}

impl Grid {
    /// Side length of the cube in cells.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Cell values, row-major (`i` slowest).
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// One cell. Panics if any coordinate is `>= dim()`; use
    /// [`get`](Self::get) for a checked lookup.
    pub fn at(&self, i: usize, j: usize, k: usize) -> f32 {
        self.get(i, j, k).unwrap_or_else(|| {
            panic!("grid coordinate ({i}, {j}, {k}) out of range for dim {}", self.dim)
        })
    }

    /// One cell, or `None` when a coordinate lies outside the cube.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        if i >= self.dim || j >= self.dim || k >= self.dim {
            return None;
        }
        self.data.get((i * self.dim + j) * self.dim + k).copied()
    }

    /// The Hubble-scaling warning produced for this grid, if any.
    pub fn warning(&self) -> Option<&ScalingWarning> {
        self.warning.as_ref()
    }
}

/// Grid dimension from the input parameters, falling back to the legacy
/// attribute name used by older outputs.
fn grid_dim<S: StoreRead>(store: &S) -> Result<usize> {
    match store.attr("InputParams", "ReionGridDim") {
        Ok(attr) => Ok(attr.expect_usize("InputParams/ReionGridDim")?),
        Err(StoreError::MissingAttribute { .. }) => {
            let attr = store.attr("InputParams", "TOCF_HII_dim")?;
            Ok(attr.expect_usize("InputParams/TOCF_HII_dim")?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Read one named grid from a snapshot.
pub fn read_grid<S: StoreRead>(
    store: &S,
    ctx: &ReadContext,
    snapshot: i64,
    name: &str,
) -> Result<Grid> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let dim = grid_dim(store)?;
    let path = format!("Snap{snapshot:03}/Grids/{name}");
    if !store.contains(&path) {
        return Err(Error::MissingDataset(path));
    }
    let mut data = store.read_f32(&path)?;
    let expected = dim * dim * dim;
    if data.len() != expected {
        return Err(Error::BadShape {
            path,
            expected,
            got: data.len(),
        });
    }

    let mut warning = None;
    if let Some(h) = ctx.little_h() {
        let units = read_units(store)?;
        tracing::info!(h, grid = name, "scaling grid");
        match units.grid_conversion(name) {
            Some(conversion) if !conversion.is_identity() => {
                for v in &mut data {
                    *v = conversion.apply(*v as f64, h) as f32;
                }
            }
            Some(HubbleConversion::Unrecognised(expression)) => {
                warning = Some(ScalingWarning::UnrecognisedConversion {
                    property: name.to_string(),
                    expression: expression.clone(),
                });
            }
            Some(_) => {}
            None => {
                warning = Some(ScalingWarning::UnknownProperty(name.to_string()));
            }
        }
        if let Some(w) = &warning {
            tracing::warn!("{w}");
        }
    }

    Ok(Grid { dim, data, warning })
}

/// List the grids available for a snapshot.
pub fn list_grids<S: StoreRead>(store: &S, snapshot: i64) -> Result<Vec<String>> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let path = format!("Snap{snapshot:03}/Grids");
    if !store.contains(&path) {
        return Err(Error::MissingDataset(path));
    }
    Ok(store.child_names(&path)?)
}

// ---------------------------------------------------------------------------
// Spectra and distributions
// ---------------------------------------------------------------------------

/// The 21cm power spectrum of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    /// k values (Mpc⁻¹).
    pub k: Vec<f32>,
    /// Power values.
    pub power: Vec<f32>,
    /// Per-bin errors.
    pub error: Vec<f32>,
}

/// Read the 21cm power spectrum of a snapshot.
pub fn read_ps<S: StoreRead>(store: &S, snapshot: i64) -> Result<PowerSpectrum> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let path = format!("Snap{snapshot:03}/PowerSpectrum");
    if !store.contains(&path) {
        return Err(Error::MissingDataset(path));
    }
    let nbins = store.attr(&path, "nbins")?.expect_usize(&path)?;
    let flat = store.read_f32(&path)?;
    if flat.len() != nbins * 3 {
        return Err(Error::BadShape {
            path,
            expected: nbins * 3,
            got: flat.len(),
        });
    }
    let mut ps = PowerSpectrum {
        k: Vec::with_capacity(nbins),
        power: Vec::with_capacity(nbins),
        error: Vec::with_capacity(nbins),
    };
    for row in flat.chunks_exact(3) {
        ps.k.push(row[0]);
        ps.power.push(row[1]);
        ps.error.push(row[2]);
    }
    Ok(ps)
}

/// The ionized-region size distribution of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeDist {
    pub r: Vec<f32>,
    pub r_dp_dr: Vec<f32>,
}

/// Read the region size distribution of a snapshot.
pub fn read_size_dist<S: StoreRead>(store: &S, snapshot: i64) -> Result<SizeDist> {
    let snapshot = resolve_snapshot(store, snapshot)?;
    let path = format!("Snap{snapshot:03}/RegionSizeDist");
    if !store.contains(&path) {
        return Err(Error::MissingDataset(path));
    }
    let nbins = store.attr(&path, "nbins")?.expect_usize(&path)?;
    let flat = store.read_f32(&path)?;
    if flat.len() != nbins * 2 {
        return Err(Error::BadShape {
            path,
            expected: nbins * 2,
            got: flat.len(),
        });
    }
    let mut dist = SizeDist {
        r: Vec::with_capacity(nbins),
        r_dp_dr: Vec::with_capacity(nbins),
    };
    for row in flat.chunks_exact(2) {
        dist.r.push(row[0]);
        dist.r_dp_dr.push(row[1]);
    }
    Ok(dist)
}

// ---------------------------------------------------------------------------
// Global neutral fraction
// ---------------------------------------------------------------------------

/// Weighting scheme for the global neutral fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XhWeight {
    Volume,
    Mass,
}

/// Read the global neutral fraction for each listed snapshot.
///
/// Snapshots without a recorded value yield NaN rather than an error;
/// volume weighting falls back to the attribute name older outputs used.
pub fn read_global_xh<S: StoreRead>(
    store: &S,
    snapshots: &[u32],
    weight: XhWeight,
) -> Result<Vec<f64>> {
    let attr_name = match weight {
        XhWeight::Volume => "volume_weighted_global_xH",
        XhWeight::Mass => "mass_weighted_global_xH",
    };
    let mut out = Vec::with_capacity(snapshots.len());
    for &snap in snapshots {
        let path = format!("{}/Grids/xH", snap_group(snap));
        let mut value = store.attr(&path, attr_name).ok().and_then(|a| a.as_f64());
        if value.is_none() && weight == XhWeight::Volume {
            // Old-style outputs store the volume-weighted value plainly.
            value = store.attr(&path, "global_xH").ok().and_then(|a| a.as_f64());
        }
        match value {
            Some(v) => out.push(v),
            None => {
                tracing::warn!(snapshot = snap, "no global_xH recorded");
                out.push(f64::NAN);
            }
        }
    }
    Ok(out)
}
