//! Ordered driver registry.
//!
//! Drivers are consulted in registration order and the first one that can
//! handle a reference wins, so register the most specific driver first. The
//! registry is built once from explicit data and only read afterwards; it is
//! `Send + Sync` and needs no locking.
//!
//! ## Example
//!
//! ```rust
//! use gor_driver::core::reference::SourceReference;
//! use gor_driver::driver::file::FileDriver;
//! use gor_driver::driver::mem::MemDriver;
//! use gor_driver::registry::{DriverRegistry, MatchPredicate};
//!
//! let registry = DriverRegistry::new()
//!     .with_driver(MatchPredicate::Suffix(".mem".to_string()).wrap(MemDriver::default()))
//!     .with_driver(FileDriver::new());
//!
//! let driver = registry.dispatch(&SourceReference::new("1.mem")).unwrap();
//! assert_eq!(driver.name(), "mem");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::SourceError;
use crate::core::reference::SourceReference;
use crate::core::resolved::ResolvedReference;
use crate::core::source::DataSource;
use crate::driver::SourceDriver;

pub mod config;

/// Declarative predicate a configured driver entry must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPredicate {
    /// Defer entirely to the driver
    #[default]
    Any,
    /// Normalized reference ends with the given text (case-insensitive)
    Suffix(String),
    /// Normalized reference starts with the given text
    Prefix(String),
    /// Reference carries the given URI scheme (case-insensitive)
    Scheme(String),
}

impl MatchPredicate {
    #[must_use]
    pub fn matches(&self, reference: &SourceReference) -> bool {
        let normalized = reference.normalized();
        match self {
            Self::Any => true,
            Self::Suffix(suffix) => normalized
                .to_lowercase()
                .ends_with(&suffix.to_lowercase()),
            Self::Prefix(prefix) => normalized.starts_with(prefix.as_str()),
            Self::Scheme(scheme) => reference
                .scheme()
                .is_some_and(|s| s.eq_ignore_ascii_case(scheme)),
        }
    }

    /// Restrict `driver` to references this predicate matches
    pub fn wrap<D: SourceDriver>(self, driver: D) -> Matched<D> {
        Matched {
            predicate: self,
            inner: driver,
        }
    }
}

/// A driver guarded by a configured predicate
#[derive(Debug)]
pub struct Matched<D> {
    predicate: MatchPredicate,
    inner: D,
}

impl<D> Matched<D> {
    #[must_use]
    pub fn predicate(&self) -> &MatchPredicate {
        &self.predicate
    }
}

impl<D: SourceDriver> SourceDriver for Matched<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn can_handle(&self, reference: &SourceReference) -> bool {
        self.predicate.matches(reference) && self.inner.can_handle(reference)
    }

    fn open(&self, resolved: &ResolvedReference) -> Result<Box<dyn DataSource>, SourceError> {
        self.inner.open(resolved)
    }
}

/// Ordered set of drivers, dispatched first-match-wins
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: Vec<Box<dyn SourceDriver>>,
}

impl DriverRegistry {
    /// Create a registry with no drivers
    #[must_use]
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Append a driver; it is consulted after all earlier ones
    pub fn register(&mut self, driver: impl SourceDriver + 'static) {
        self.drivers.push(Box::new(driver));
    }

    /// Append an already boxed driver
    pub fn register_boxed(&mut self, driver: Box<dyn SourceDriver>) {
        self.drivers.push(driver);
    }

    #[must_use]
    pub fn with_driver(mut self, driver: impl SourceDriver + 'static) -> Self {
        self.register(driver);
        self
    }

    /// Find the first driver that can handle `reference`
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NoApplicableDriver` if no registered driver
    /// accepts the reference, including when the registry is empty.
    pub fn dispatch(&self, reference: &SourceReference) -> Result<&dyn SourceDriver, SourceError> {
        let driver = self
            .drivers
            .iter()
            .find(|driver| driver.can_handle(reference))
            .ok_or_else(|| SourceError::NoApplicableDriver {
                reference: reference.normalized().to_string(),
            })?;

        debug!(reference = %reference, driver = driver.name(), "Dispatched reference");
        Ok(driver.as_ref())
    }

    /// Driver names in dispatch order
    #[must_use]
    pub fn driver_names(&self) -> Vec<&str> {
        self.drivers.iter().map(|driver| driver.name()).collect()
    }

    /// Number of registered drivers
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Check if no drivers are registered
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
