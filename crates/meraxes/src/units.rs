//! Units and Hubble-constant conversions.
//!
//! The model records, per property, a unit string and a conversion telling
//! how the stored value depends on little-h. The conversions the model
//! writes form a small closed set, so they are parsed once into a tagged
//! enum instead of being evaluated as expressions. An unrecognised
//! conversion degrades to identity and is reported as a warning value;
//! unit scaling is the one place degraded-but-continues behaviour is kept.

use std::collections::BTreeMap;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use meraxes_store::{RecordSchema, Scalar, StoreError, StoreRead};

use crate::error::Result;

// ---------------------------------------------------------------------------
// HubbleConversion
// ---------------------------------------------------------------------------

/// How a stored value scales with the Hubble constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubbleConversion {
    /// No dependence on little-h.
    Identity,
    /// Stored value carries a factor of h: divide to remove it.
    DivideByH,
    /// Stored value carries a factor of 1/h: multiply to remove it.
    MultiplyByH,
    /// Stored value is log10 of an h-carrying quantity.
    Log10DivideByH,
    /// A conversion string outside the known set; applies as identity.
    Unrecognised(String),
}

impl HubbleConversion {
    /// Parse one of the conversion strings the model writes.
    ///
    /// Whitespace and the legacy `np.` prefixes are ignored.
    pub fn parse(raw: &str) -> Self {
        let normalised: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace("np.", "")
            .to_ascii_lowercase();
        match normalised.as_str() {
            "" | "none" => HubbleConversion::Identity,
            "v/h" => HubbleConversion::DivideByH,
            "v*h" | "h*v" => HubbleConversion::MultiplyByH,
            "log10(v/h)" => HubbleConversion::Log10DivideByH,
            _ => HubbleConversion::Unrecognised(raw.to_string()),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            HubbleConversion::Identity | HubbleConversion::Unrecognised(_)
        )
    }

    /// Apply the conversion elementwise.
    pub fn apply(&self, v: f64, h: f64) -> f64 {
        match self {
            HubbleConversion::Identity | HubbleConversion::Unrecognised(_) => v,
            HubbleConversion::DivideByH => v / h,
            HubbleConversion::MultiplyByH => v * h,
            HubbleConversion::Log10DivideByH => (v / h).log10(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScalingWarning
// ---------------------------------------------------------------------------

/// A non-fatal problem encountered while scaling to little-h.
///
/// Carried alongside the scaled values so callers can inspect degradation
/// without relying on log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingWarning {
    /// No conversion is recorded for the property; assumed identity.
    UnknownProperty(String),
    /// The recorded conversion string is outside the known set.
    UnrecognisedConversion { property: String, expression: String },
    /// A non-identity conversion was recorded for an integer field.
    NonFloatField(String),
}

impl fmt::Display for ScalingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingWarning::UnknownProperty(name) => {
                write!(f, "no Hubble conversion recorded for `{name}`, left unscaled")
            }
            ScalingWarning::UnrecognisedConversion {
                property,
                expression,
            } => {
                write!(
                    f,
                    "unrecognised Hubble conversion `{expression}` for `{property}`, left unscaled"
                )
            }
            ScalingWarning::NonFloatField(name) => {
                write!(f, "integer field `{name}` cannot be Hubble-scaled, left unscaled")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Unit strings and Hubble conversions for galaxy properties and grids.
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    units: BTreeMap<String, String>,
    conversions: BTreeMap<String, HubbleConversion>,
    grid_conversions: BTreeMap<String, HubbleConversion>,
}

impl Units {
    /// Unit string of a galaxy property.
    pub fn unit(&self, property: &str) -> Option<&str> {
        self.units.get(property).map(String::as_str)
    }

    /// Hubble conversion of a galaxy property.
    pub fn conversion(&self, property: &str) -> Option<&HubbleConversion> {
        self.conversions.get(property)
    }

    /// Hubble conversion of a reionization grid.
    pub fn grid_conversion(&self, grid: &str) -> Option<&HubbleConversion> {
        self.grid_conversions.get(grid)
    }
}

/// Read the `Units` and `HubbleConversions` groups.
pub fn read_units<S: StoreRead>(store: &S) -> Result<Units> {
    let units = string_attrs(store, "Units")?
        .into_iter()
        .collect::<BTreeMap<_, _>>();

    let conversions = string_attrs(store, "HubbleConversions")?
        .into_iter()
        .map(|(name, raw)| (name, HubbleConversion::parse(&raw)))
        .collect::<BTreeMap<_, _>>();

    // Grid conversions live one level down; the sub-group is optional.
    let grid_conversions = if store.contains("HubbleConversions/Grids") {
        string_attrs(store, "HubbleConversions/Grids")?
            .into_iter()
            .map(|(name, raw)| (name, HubbleConversion::parse(&raw)))
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(Units {
        units,
        conversions,
        grid_conversions,
    })
}

/// All string-valued attributes of a group, by name.
fn string_attrs<S: StoreRead>(store: &S, path: &str) -> Result<Vec<(String, String)>> {
    if !store.contains(path) {
        return Err(StoreError::NotFound(path.to_string()).into());
    }
    let mut out = Vec::new();
    for name in store.attr_names(path)? {
        if let Ok(value) = store.attr(path, &name) {
            if let Some(s) = value.as_str() {
                out.push((name, s.to_string()));
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// In-place scaling over packed rows
// ---------------------------------------------------------------------------

/// Scale a packed galaxy buffer to little-h in place.
///
/// Returns the warnings produced for fields that could not be scaled.
pub(crate) fn apply_hubble_scaling(
    schema: &RecordSchema,
    data: &mut [u8],
    units: &Units,
    h: f64,
) -> Vec<ScalingWarning> {
    let record_size = schema.record_size();
    let n_rows = if record_size == 0 {
        0
    } else {
        data.len() / record_size
    };
    let mut warnings = Vec::new();

    for field in schema.fields() {
        let conversion = match units.conversion(&field.name) {
            Some(conversion) => conversion,
            None => {
                warnings.push(ScalingWarning::UnknownProperty(field.name.clone()));
                continue;
            }
        };
        match conversion {
            HubbleConversion::Identity => continue,
            HubbleConversion::Unrecognised(expression) => {
                warnings.push(ScalingWarning::UnrecognisedConversion {
                    property: field.name.clone(),
                    expression: expression.clone(),
                });
                continue;
            }
            _ => {}
        }

        let offset = match schema.offset_of(&field.name) {
            Some(offset) => offset,
            None => continue,
        };
        let elem = field.scalar.size();
        match field.scalar {
            Scalar::F32 => {
                for row in 0..n_rows {
                    let base = row * record_size + offset;
                    for i in 0..field.count {
                        let at = base + i * elem;
                        let v = LittleEndian::read_f32(&data[at..at + elem]);
                        let scaled = conversion.apply(v as f64, h) as f32;
                        LittleEndian::write_f32(&mut data[at..at + elem], scaled);
                    }
                }
            }
            Scalar::F64 => {
                for row in 0..n_rows {
                    let base = row * record_size + offset;
                    for i in 0..field.count {
                        let at = base + i * elem;
                        let v = LittleEndian::read_f64(&data[at..at + elem]);
                        let scaled = conversion.apply(v, h);
                        LittleEndian::write_f64(&mut data[at..at + elem], scaled);
                    }
                }
            }
            Scalar::I32 | Scalar::I64 => {
                warnings.push(ScalingWarning::NonFloatField(field.name.clone()));
            }
        }
    }

    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    warnings
}
