//! Composition of resolver, registry and drivers.
//!
//! [`SourceProvider`] is built from plain data: a [`DriverRegistry`] and a
//! [`LinkResolver`], or a [`RegistryConfig`] that describes both. There is no
//! container or ambient lookup; the process-wide instance returned by
//! [`SourceProvider::global`] is built from `RegistryConfig::default()` the
//! first time it is asked for.

use std::sync::OnceLock;

use tracing::debug;

use crate::core::error::SourceError;
use crate::core::reference::SourceReference;
use crate::core::resolved::ResolvedReference;
use crate::core::source::{Capability, DataSource};
use crate::iterator::GenomicIterator;
use crate::link::LinkResolver;
use crate::registry::config::{ConfigError, RegistryConfig};
use crate::registry::DriverRegistry;

static GLOBAL: OnceLock<SourceProvider> = OnceLock::new();

#[derive(Debug)]
pub struct SourceProvider {
    registry: DriverRegistry,
    resolver: LinkResolver,
}

impl SourceProvider {
    #[must_use]
    pub fn new(registry: DriverRegistry, resolver: LinkResolver) -> Self {
        Self { registry, resolver }
    }

    /// Build from configuration data
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMaxHops` if the configuration fails validation.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.build_registry(), config.build_resolver()))
    }

    /// Process-wide provider with the default driver set
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::default)
    }

    #[must_use]
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    #[must_use]
    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    /// Follow links from `reference` to its terminal reference
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Resolution` for cycles, missing or malformed
    /// links, and chains longer than the configured hop limit.
    pub fn resolve(&self, reference: &SourceReference) -> Result<ResolvedReference, SourceError> {
        Ok(self.resolver.resolve(reference)?)
    }

    /// Resolve `reference` and open a source for it
    ///
    /// The reference is dispatched before any I/O happens. When links were
    /// followed, the terminal is dispatched again so that the driver for the
    /// concrete data opens it.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NoApplicableDriver` if no driver accepts the
    /// reference or its terminal, `SourceError::Resolution` if link
    /// resolution fails, or whatever the chosen driver reports.
    pub fn data_source(
        &self,
        reference: &SourceReference,
    ) -> Result<Box<dyn DataSource>, SourceError> {
        let mut driver = self.registry.dispatch(reference)?;
        let resolved = self.resolve(reference)?;

        if resolved.is_indirect() {
            driver = self.registry.dispatch(resolved.terminal())?;
        }

        debug!(
            reference = %reference,
            terminal = %resolved.terminal(),
            driver = driver.name(),
            "Opening source"
        );
        driver.open(&resolved)
    }

    /// Resolve `reference` and return a row iterator that owns the source
    ///
    /// # Errors
    ///
    /// Everything `data_source` can return, plus `SourceError::NotIterable`
    /// when the source cannot be iterated.
    pub fn create_iterator(
        &self,
        reference: &SourceReference,
    ) -> Result<Box<dyn GenomicIterator>, SourceError> {
        let source = self.data_source(reference)?;
        if !source.supports(Capability::Iterate) {
            return Err(SourceError::NotIterable {
                reference: source.name().to_string(),
            });
        }
        source.into_iterator()
    }
}

impl Default for SourceProvider {
    fn default() -> Self {
        let config = RegistryConfig::default();
        Self::new(config.build_registry(), config.build_resolver())
    }
}
