//! Per-call read configuration.
//!
//! The legacy reader kept a process-wide little-h override that every call
//! consulted implicitly. Here the override is an explicit immutable context
//! threaded through calls: build one once, pass it everywhere, and every call
//! sees a stable value for its whole duration.

use meraxes_store::StoreRead;

use crate::error::Result;

/// Immutable configuration for read calls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadContext {
    little_h: Option<f64>,
}

impl ReadContext {
    /// A context with no Hubble scaling.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that scales applicable quantities to the given little-h.
    ///
    /// `h == 1.0` means no scaling and is normalised to `None`.
    pub fn with_little_h(h: f64) -> Self {
        Self {
            little_h: if h == 1.0 { None } else { Some(h) },
        }
    }

    /// A context using the simulation's own `Hubble_h` input parameter.
    pub fn from_params<S: StoreRead>(store: &S) -> Result<Self> {
        let attr = store.attr("InputParams", "Hubble_h")?;
        let h = attr.expect_f64("InputParams/Hubble_h")?;
        Ok(Self::with_little_h(h))
    }

    /// The little-h value to scale to, if any.
    pub fn little_h(&self) -> Option<f64> {
        self.little_h
    }
}
