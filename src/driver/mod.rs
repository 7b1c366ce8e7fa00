//! Protocol-specific source drivers.
//!
//! A driver answers two questions about a reference: can it handle it, and
//! what source does it open for the resolved form. Drivers hold no per-call
//! state, so one instance serves every thread.
//!
//! - [`FileDriver`](file::FileDriver): local files, plain or gzip-compressed
//! - [`MemDriver`](mem::MemDriver): synthetic rows for `*.mem` references

use crate::core::error::SourceError;
use crate::core::reference::SourceReference;
use crate::core::resolved::ResolvedReference;
use crate::core::source::DataSource;

pub mod file;
pub mod mem;

pub trait SourceDriver: Send + Sync + std::fmt::Debug {
    /// Short identifier shown in listings and logs
    fn name(&self) -> &str;

    fn can_handle(&self, reference: &SourceReference) -> bool;

    /// Open a source for the terminal of `resolved`
    ///
    /// Only the handles the source needs are acquired, and any acquired
    /// before a failure are released before the error is returned.
    fn open(&self, resolved: &ResolvedReference) -> Result<Box<dyn DataSource>, SourceError>;
}
