//! Input parameters and git provenance.

use std::collections::BTreeMap;

use meraxes_store::{AttrValue, StoreRead};

use crate::context::ReadContext;
use crate::error::Result;

/// Git state of the model build that produced the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// The ref the model was built from.
    pub reference: String,
    /// The uncommitted diff at build time, if any.
    pub diff: String,
}

/// Read the git ref and diff saved in the master file.
pub fn read_git_info<S: StoreRead>(store: &S) -> Result<GitInfo> {
    let diff = store.read_str("gitdiff")?;
    let reference = store
        .attr("gitdiff", "gitref")?
        .expect_str("gitdiff/gitref")?
        .to_string();
    Ok(GitInfo { reference, diff })
}

/// The model's input parameters, plus a few derived quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParams {
    /// Top-level `InputParams` attributes. `BoxSize` and `PartMass` are
    /// scaled to little-h when the context carries one.
    pub params: BTreeMap<String, AttrValue>,
    /// Attributes of the immediate sub-groups of `InputParams`, by group.
    pub groups: BTreeMap<String, BTreeMap<String, AttrValue>>,
    /// Comoving volume: `BoxSize³ × VolumeFactor`.
    pub volume: f64,
    /// Provenance of the model build.
    pub git: GitInfo,
}

/// Read the input parameters from the `InputParams` group.
pub fn read_input_params<S: StoreRead>(store: &S, ctx: &ReadContext) -> Result<InputParams> {
    tracing::info!("reading input params");
    let mut params = attrs_of(store, "InputParams")?;

    let mut groups = BTreeMap::new();
    for child in store.child_names("InputParams")? {
        let path = format!("InputParams/{child}");
        groups.insert(child, attrs_of(store, &path)?);
    }

    if let Some(h) = ctx.little_h() {
        tracing::info!(h, "scaling params");
        for name in ["BoxSize", "PartMass"] {
            let raw = store.attr("InputParams", name)?;
            let value = raw.expect_f64(name)?;
            params.insert(name.to_string(), AttrValue::F64(value / h));
        }
    }

    let box_size = params
        .get("BoxSize")
        .and_then(AttrValue::as_f64)
        .unwrap_or(0.0);
    let volume_factor = store
        .attr("InputParams", "VolumeFactor")?
        .expect_f64("InputParams/VolumeFactor")?;
    let volume = box_size.powi(3) * volume_factor;

    let git = read_git_info(store)?;

    Ok(InputParams {
        params,
        groups,
        volume,
        git,
    })
}

fn attrs_of<S: StoreRead>(store: &S, path: &str) -> Result<BTreeMap<String, AttrValue>> {
    let mut out = BTreeMap::new();
    for name in store.attr_names(path)? {
        out.insert(name.clone(), store.attr(path, &name)?);
    }
    Ok(out)
}
