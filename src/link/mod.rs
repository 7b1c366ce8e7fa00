//! Link indirection.
//!
//! A link file holds a single reference to another location, possibly another
//! link. [`LinkResolver`] follows them until it reaches concrete data:
//!
//! ```text
//! genes.link  ->  store/latest.link  ->  store/genes-2024.gor
//! ```
//!
//! Relative targets are anchored at the directory holding the link file.
//! Blank lines and `#` comments in a link file are ignored. When a local path
//! does not exist but `<path>.link` does, the sibling link is followed. A link
//! whose local target is missing is an error; references registered as
//! virtual (such as `*.mem`) are never looked up on disk.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gor_driver::link::LinkResolver;
//! use gor_driver::core::reference::SourceReference;
//!
//! let resolver = LinkResolver::default();
//! let resolved = resolver.resolve(&SourceReference::new("/data/genes.gor.link")).unwrap();
//! println!("{} after {} hops", resolved.terminal(), resolved.hops());
//! ```

pub mod resolver;

pub use resolver::LinkResolver;
