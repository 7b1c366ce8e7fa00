//! Core data types for driver resolution.
//!
//! - [`SourceReference`](reference::SourceReference): an immutable description of where data lives
//! - [`ResolvedReference`](resolved::ResolvedReference): the reference after link indirection
//! - [`ResourceHandle`](handle::ResourceHandle): one open descriptor with explicit release
//! - [`DataSource`](source::DataSource): an opened endpoint that owns its handles
//! - [`Row`](row::Row): a record produced by iteration
//! - [`SourceError`](error::SourceError): the error taxonomy
//!
//! ## Reference kinds
//!
//! | Reference | Kind |
//! |-----------|------|
//! | `/data/genes.gor` | Path |
//! | `file:///data/genes.gor` | Path (scheme stripped) |
//! | `/data/genes.gor.link` | Link |
//! | `s3://bucket/genes.gor` | Url |

pub mod error;
pub mod handle;
pub mod reference;
pub mod resolved;
pub mod row;
pub mod source;
