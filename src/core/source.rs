use serde::Serialize;
use std::io::Read;

use crate::core::error::SourceError;
use crate::core::resolved::ResolvedReference;
use crate::iterator::GenomicIterator;

/// An operation a source may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Exists,
    Open,
    Iterate,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exists => write!(f, "exists"),
            Self::Open => write!(f, "open"),
            Self::Iterate => write!(f, "iterate"),
        }
    }
}

/// A logical data endpoint produced by a driver
///
/// A source exclusively owns the resource handles it acquires. `close`
/// releases all of them and may be called any number of times; dropping a
/// source closes it as well.
pub trait DataSource: Send + std::fmt::Debug {
    /// The resolution that produced this source
    fn reference(&self) -> &ResolvedReference;

    /// Driver-visible name of the concrete data
    fn name(&self) -> &str {
        self.reference().terminal().normalized()
    }

    fn capabilities(&self) -> &'static [Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether the concrete data exists
    ///
    /// Never reads the payload and holds no handle once it returns.
    fn exists(&self) -> Result<bool, SourceError>;

    /// Acquire a fresh reader over the raw bytes
    ///
    /// Any reader from an earlier call is released first.
    fn open(&mut self) -> Result<&mut dyn Read, SourceError> {
        Err(SourceError::UnsupportedCapability {
            reference: self.name().to_string(),
            capability: Capability::Open,
        })
    }

    /// Turn this source into a row iterator that owns it
    fn into_iterator(self: Box<Self>) -> Result<Box<dyn GenomicIterator>, SourceError> {
        Err(SourceError::NotIterable {
            reference: self.name().to_string(),
        })
    }

    /// Handles currently owned by this source
    fn open_handle_count(&self) -> usize;

    /// Release every owned handle
    fn close(&mut self);
}
