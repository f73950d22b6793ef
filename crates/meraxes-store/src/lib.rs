//! In-memory hierarchical container backing the `meraxes` reader.
//!
//! The reader layer treats file access as a capability: something that can
//! be opened read-only, list its children, answer attribute queries, and
//! read datasets into caller-provided buffers. This crate defines that
//! capability ([`StoreRead`]), the shared data vocabulary (attributes,
//! record schemas, datasets, row selections), an immutable in-memory
//! implementation ([`MemStore`]), and a builder for synthesising containers
//! in tests and tools ([`StoreBuilder`]).
//!
//! ```
//! use meraxes_store::{AttrValue, StoreBuilder, StoreRead};
//!
//! let mut b = StoreBuilder::new();
//! b.set_attr("NCores", AttrValue::I64Array(vec![1]));
//! b.create_dataset("Snap000/Core0/Galaxies").with_i32_data(&[]);
//! let store = b.finish();
//! assert_eq!(store.attr("", "NCores").unwrap().as_usize(), Some(1));
//! ```

pub mod attr;
pub mod builder;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod selection;
pub mod store;

pub use attr::AttrValue;
pub use builder::{DatasetBuilder, StoreBuilder};
pub use dataset::{
    decode_f32_column, decode_f64_column, decode_i32_column, decode_i64_column, Dataset,
    RecordBatch, Value,
};
pub use error::{Result, StoreError};
pub use schema::{Field, RecordSchema, Scalar};
pub use selection::Selection;
pub use store::{MemStore, StoreRead};
