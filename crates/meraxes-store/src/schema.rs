//! Record schemas for compound (structured) datasets.
//!
//! A galaxy table is a homogeneous record array: a fixed ordered set of
//! named fields, each a scalar or a fixed-length vector of one primitive
//! type. Rows are stored packed, little-endian, in field order.

use crate::error::{Result, StoreError};

/// Primitive element type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    F32,
    F64,
    I32,
    I64,
}

impl Scalar {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Scalar::F32 | Scalar::I32 => 4,
            Scalar::F64 | Scalar::I64 => 8,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
        }
    }
}

/// One named field of a record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub scalar: Scalar,
    /// Number of elements: 1 for a scalar field, >1 for a fixed-length
    /// vector field (e.g. a 3-component position).
    pub count: usize,
}

impl Field {
    /// A scalar field.
    pub fn scalar(name: &str, scalar: Scalar) -> Self {
        Self {
            name: name.to_string(),
            scalar,
            count: 1,
        }
    }

    /// A fixed-length vector field.
    pub fn vector(name: &str, scalar: Scalar, count: usize) -> Self {
        Self {
            name: name.to_string(),
            scalar,
            count,
        }
    }

    /// Size of the field within a packed row, in bytes.
    pub fn size(&self) -> usize {
        self.scalar.size() * self.count
    }
}

/// An ordered set of named, typed fields describing one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSchema {
    fields: Vec<Field>,
}

impl RecordSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size of one packed row in bytes.
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(Field::size).sum()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Byte offset of a field within a packed row.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for f in &self.fields {
            if f.name == name {
                return Some(offset);
            }
            offset += f.size();
        }
        None
    }

    /// Iterate over field names in row order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// A new schema holding only the named fields, in the requested order.
    pub fn restrict(&self, names: &[&str]) -> Result<RecordSchema> {
        let mut fields = Vec::with_capacity(names.len());
        for &name in names {
            let field = self
                .field(name)
                .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
            fields.push(field.clone());
        }
        Ok(RecordSchema::new(fields))
    }
}
