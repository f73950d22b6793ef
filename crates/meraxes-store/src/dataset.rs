//! Dataset payloads: primitive arrays and packed record batches.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, StoreError};
use crate::schema::{RecordSchema, Scalar};
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Value: one field's worth of data when building a row
// ---------------------------------------------------------------------------

/// A single field value used when pushing rows into a [`RecordBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    F32s(Vec<f32>),
    F64s(Vec<f64>),
    I32s(Vec<i32>),
    I64s(Vec<i64>),
}

impl Value {
    fn scalar(&self) -> Scalar {
        match self {
            Value::F32(_) | Value::F32s(_) => Scalar::F32,
            Value::F64(_) | Value::F64s(_) => Scalar::F64,
            Value::I32(_) | Value::I32s(_) => Scalar::I32,
            Value::I64(_) | Value::I64s(_) => Scalar::I64,
        }
    }

    fn count(&self) -> usize {
        match self {
            Value::F32s(vs) => vs.len(),
            Value::F64s(vs) => vs.len(),
            Value::I32s(vs) => vs.len(),
            Value::I64s(vs) => vs.len(),
            _ => 1,
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Value::F32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::F64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::I32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::I64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::F32s(vs) => {
                for v in vs {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
            Value::F64s(vs) => {
                for v in vs {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
            Value::I32s(vs) => {
                for v in vs {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
            Value::I64s(vs) => {
                for v in vs {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RecordBatch
// ---------------------------------------------------------------------------

/// A homogeneous record array: a schema plus packed little-endian rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    schema: RecordSchema,
    data: Vec<u8>,
}

impl RecordBatch {
    /// An empty batch with the given schema.
    pub fn new(schema: RecordSchema) -> Self {
        Self {
            schema,
            data: Vec::new(),
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        let size = self.schema.record_size();
        if size == 0 {
            0
        } else {
            self.data.len() / size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The packed row bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The packed bytes of one row.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        let size = self.schema.record_size();
        if row < self.len() {
            Some(&self.data[row * size..(row + 1) * size])
        } else {
            None
        }
    }

    /// Append one row. Values must match the schema's fields in order.
    pub fn push_row(&mut self, values: &[Value]) -> Result<()> {
        let fields = self.schema.fields();
        if values.len() != fields.len() {
            return Err(StoreError::SchemaMismatch(format!(
                "expected {} fields, got {}",
                fields.len(),
                values.len()
            )));
        }
        for (field, value) in fields.iter().zip(values) {
            if value.scalar() != field.scalar || value.count() != field.count {
                return Err(StoreError::SchemaMismatch(format!(
                    "field `{}` expects {}x{}, got {}x{}",
                    field.name,
                    field.scalar.type_name(),
                    field.count,
                    value.scalar().type_name(),
                    value.count()
                )));
            }
        }
        for value in values {
            value.encode_into(&mut self.data);
        }
        Ok(())
    }

    /// Gather the fields named by `out` for the selected rows, packing them
    /// into `dest` in `out`'s field order. Returns the number of rows
    /// written.
    ///
    /// `dest` must hold at least `selection.num_rows(len) * out.record_size()`
    /// bytes from the start; placement is sequential from `dest[0]`.
    pub fn gather_into(
        &self,
        path: &str,
        out: &RecordSchema,
        selection: &Selection,
        dest: &mut [u8],
    ) -> Result<usize> {
        let out_size = out.record_size();
        let n_rows = selection.num_rows(self.len());
        let needed = n_rows * out_size;
        if dest.len() < needed {
            return Err(StoreError::DestinationTooSmall {
                needed,
                available: dest.len(),
            });
        }

        // Resolve each output field to its (source offset, size) once.
        let mut spans = Vec::with_capacity(out.fields().len());
        for field in out.fields() {
            let offset = self
                .schema
                .offset_of(&field.name)
                .ok_or_else(|| StoreError::UnknownField(field.name.clone()))?;
            spans.push((offset, field.size()));
        }

        let mut cursor = 0;
        let mut write_row = |row: usize, dest: &mut [u8]| -> Result<()> {
            debug_assert!(cursor + out_size <= needed);
            let src = self.row(row).ok_or_else(|| StoreError::RowOutOfBounds {
                path: path.to_string(),
                row,
                len: self.len(),
            })?;
            for &(offset, size) in &spans {
                dest[cursor..cursor + size].copy_from_slice(&src[offset..offset + size]);
                cursor += size;
            }
            Ok(())
        };

        match selection {
            Selection::All => {
                for row in 0..self.len() {
                    write_row(row, dest)?;
                }
            }
            Selection::Rows(rows) => {
                for &row in rows {
                    write_row(row, dest)?;
                }
            }
        }
        Ok(n_rows)
    }
}

// ---------------------------------------------------------------------------
// Column decoding helpers
// ---------------------------------------------------------------------------

/// Decode an `f32` column (scalar or vector field, flattened) from packed
/// rows laid out by `schema`.
pub fn decode_f32_column(schema: &RecordSchema, data: &[u8], name: &str) -> Result<Vec<f32>> {
    decode_column(schema, data, name, Scalar::F32, |bytes| {
        LittleEndian::read_f32(bytes)
    })
}

/// Decode an `f64` column from packed rows.
pub fn decode_f64_column(schema: &RecordSchema, data: &[u8], name: &str) -> Result<Vec<f64>> {
    decode_column(schema, data, name, Scalar::F64, |bytes| {
        LittleEndian::read_f64(bytes)
    })
}

/// Decode an `i32` column from packed rows.
pub fn decode_i32_column(schema: &RecordSchema, data: &[u8], name: &str) -> Result<Vec<i32>> {
    decode_column(schema, data, name, Scalar::I32, |bytes| {
        LittleEndian::read_i32(bytes)
    })
}

/// Decode an `i64` column from packed rows.
pub fn decode_i64_column(schema: &RecordSchema, data: &[u8], name: &str) -> Result<Vec<i64>> {
    decode_column(schema, data, name, Scalar::I64, |bytes| {
        LittleEndian::read_i64(bytes)
    })
}

fn decode_column<T>(
    schema: &RecordSchema,
    data: &[u8],
    name: &str,
    scalar: Scalar,
    read: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>> {
    let field = schema
        .field(name)
        .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
    if field.scalar != scalar {
        return Err(StoreError::TypeMismatch {
            path: name.to_string(),
            expected: scalar.type_name(),
            actual: field.scalar.type_name(),
        });
    }
    let record_size = schema.record_size();
    let offset = schema.offset_of(name).unwrap_or(0);
    let elem = field.scalar.size();
    let n_rows = if record_size == 0 { 0 } else { data.len() / record_size };
    let mut out = Vec::with_capacity(n_rows * field.count);
    for row in 0..n_rows {
        let base = row * record_size + offset;
        for i in 0..field.count {
            let at = base + i * elem;
            out.push(read(&data[at..at + elem]));
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The payload of one dataset node.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Str(String),
    Records(RecordBatch),
}

impl Dataset {
    /// Number of elements (rows for a record batch, 1 for a string blob).
    pub fn len(&self) -> usize {
        match self {
            Dataset::I32(vs) => vs.len(),
            Dataset::F32(vs) => vs.len(),
            Dataset::F64(vs) => vs.len(),
            Dataset::Str(_) => 1,
            Dataset::Records(batch) => batch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stored type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dataset::I32(_) => "i32[]",
            Dataset::F32(_) => "f32[]",
            Dataset::F64(_) => "f64[]",
            Dataset::Str(_) => "string",
            Dataset::Records(_) => "records",
        }
    }
}
