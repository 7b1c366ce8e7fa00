//! # gor-driver
//!
//! Pluggable data-source drivers for genomic ordered files.
//!
//! A caller hands over an opaque reference: a path, a URI, or a `.link`
//! indirection file. The framework picks a driver, follows links to the
//! concrete data, and returns a source that can report whether the data
//! exists, open it, or iterate its rows.
//!
//! ## Features
//!
//! - **Ordered dispatch**: the first registered driver that accepts a reference wins
//! - **Link resolution**: transitive, cycle-checked and bounded by a hop limit
//! - **Scoped handles**: every file descriptor is released on close, drop, and error paths
//! - **Explicit wiring**: registries are built from configuration data, never looked up
//!
//! ## Example
//!
//! ```rust,no_run
//! use gor_driver::{SourceProvider, SourceReference};
//!
//! let provider = SourceProvider::global();
//!
//! let source = provider
//!     .data_source(&SourceReference::new("/data/genes.gor.link"))
//!     .unwrap();
//! println!("{} exists: {}", source.reference(), source.exists().unwrap());
//!
//! let iterator = provider.create_iterator(&SourceReference::new("1.mem")).unwrap();
//! for row in iterator {
//!     let row = row.unwrap();
//!     println!("{}\t{}", row.chromosome, row.position);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: References, handles, sources, rows and errors
//! - [`link`]: Link indirection
//! - [`driver`]: File and in-memory drivers
//! - [`registry`]: Ordered driver registry and its configuration
//! - [`iterator`]: Row iteration over opened sources
//! - [`provider`]: Resolution, dispatch and opening in one place
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod driver;
pub mod iterator;
pub mod link;
pub mod provider;
pub mod registry;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::error::{ResolutionError, SourceError};
pub use core::reference::SourceReference;
pub use core::resolved::ResolvedReference;
pub use core::source::{Capability, DataSource};
pub use iterator::GenomicIterator;
pub use link::LinkResolver;
pub use provider::SourceProvider;
pub use registry::config::RegistryConfig;
pub use registry::DriverRegistry;
