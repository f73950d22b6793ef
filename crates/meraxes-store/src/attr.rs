//! Attribute values attached to groups and datasets.

use crate::error::{Result, StoreError};

/// A scalar or small fixed-shape attribute value.
///
/// Meraxes writes most numeric attributes as one-element arrays; the checked
/// accessors below treat a one-element array and the corresponding scalar
/// interchangeably, which is what callers want for attributes like
/// `NCores` or `NGalaxies`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    F64(f64),
    F64Array(Vec<f64>),
    I64(i64),
    I64Array(Vec<i64>),
    U64(u64),
    String(String),
    StringArray(Vec<String>),
}

impl AttrValue {
    /// The stored type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::F64(_) => "f64",
            AttrValue::F64Array(_) => "f64[]",
            AttrValue::I64(_) => "i64",
            AttrValue::I64Array(_) => "i64[]",
            AttrValue::U64(_) => "u64",
            AttrValue::String(_) => "string",
            AttrValue::StringArray(_) => "string[]",
        }
    }

    /// The value as an `f64` scalar, accepting one-element arrays and
    /// integer-typed attributes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::F64(v) => Some(*v),
            AttrValue::F64Array(vs) if vs.len() == 1 => Some(vs[0]),
            AttrValue::I64(v) => Some(*v as f64),
            AttrValue::I64Array(vs) if vs.len() == 1 => Some(vs[0] as f64),
            AttrValue::U64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The value as an `i64` scalar, accepting one-element arrays.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::I64(v) => Some(*v),
            AttrValue::I64Array(vs) if vs.len() == 1 => Some(vs[0]),
            AttrValue::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as a non-negative count.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_i64().and_then(|v| usize::try_from(v).ok())
    }

    /// The value as a string slice, accepting one-element string arrays.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            AttrValue::StringArray(ss) if ss.len() == 1 => Some(&ss[0]),
            _ => None,
        }
    }

    /// Like [`as_f64`](Self::as_f64) but reporting a typed error.
    pub fn expect_f64(&self, path: &str) -> Result<f64> {
        self.as_f64().ok_or_else(|| StoreError::TypeMismatch {
            path: path.to_string(),
            expected: "f64",
            actual: self.type_name(),
        })
    }

    /// Like [`as_usize`](Self::as_usize) but reporting a typed error.
    pub fn expect_usize(&self, path: &str) -> Result<usize> {
        self.as_usize().ok_or_else(|| StoreError::TypeMismatch {
            path: path.to_string(),
            expected: "usize",
            actual: self.type_name(),
        })
    }

    /// Like [`as_str`](Self::as_str) but reporting a typed error.
    pub fn expect_str(&self, path: &str) -> Result<&str> {
        self.as_str().ok_or_else(|| StoreError::TypeMismatch {
            path: path.to_string(),
            expected: "string",
            actual: self.type_name(),
        })
    }
}
