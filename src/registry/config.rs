use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::driver::file::FileDriver;
use crate::driver::mem::{MemDriver, MemOptions, MEM_EXTENSION};
use crate::driver::SourceDriver;
use crate::link::LinkResolver;
use crate::registry::{DriverRegistry, MatchPredicate};
use crate::utils::validation::{check_hop_limit, DEFAULT_MAX_LINK_HOPS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read driver configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse driver configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid max_link_hops: {0}")]
    InvalidMaxHops(String),
}

/// Configuration version for compatibility checking
pub const CONFIG_VERSION: &str = "1.0.0";

/// Which driver implementation an entry constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    File,
    Mem,
}

/// One `(predicate, constructor)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSpec {
    pub driver: DriverKind,

    #[serde(default, rename = "match")]
    pub predicate: MatchPredicate,

    /// Options for the memory driver; ignored by other kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemOptions>,
}

impl DriverSpec {
    #[must_use]
    pub fn new(driver: DriverKind, predicate: MatchPredicate) -> Self {
        Self {
            driver,
            predicate,
            mem: None,
        }
    }

    fn build(&self) -> Box<dyn SourceDriver> {
        let predicate = self.predicate.clone();
        match self.driver {
            DriverKind::File => Box::new(predicate.wrap(FileDriver::new())),
            DriverKind::Mem => Box::new(
                predicate.wrap(MemDriver::new(self.mem.clone().unwrap_or_default())),
            ),
        }
    }
}

/// Everything needed to assemble a registry and resolver
///
/// Entries keep their order; an empty driver list is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default = "default_max_link_hops")]
    pub max_link_hops: usize,

    #[serde(default)]
    pub drivers: Vec<DriverSpec>,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_max_link_hops() -> usize {
    DEFAULT_MAX_LINK_HOPS
}

impl RegistryConfig {
    /// A configuration with no drivers
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: default_version(),
            created_at: None,
            max_link_hops: DEFAULT_MAX_LINK_HOPS,
            drivers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_driver(mut self, spec: DriverSpec) -> Self {
        self.drivers.push(spec);
        self
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if config.version != CONFIG_VERSION {
            warn!(
                expected = CONFIG_VERSION,
                found = %config.version,
                "Driver configuration version mismatch"
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Export configuration to JSON, stamped with the export time
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let stamped = Self {
            version: CONFIG_VERSION.to_string(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            ..self.clone()
        };
        Ok(serde_json::to_string_pretty(&stamped)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(message) = check_hop_limit(self.max_link_hops) {
            return Err(ConfigError::InvalidMaxHops(message));
        }
        Ok(())
    }

    /// Build the registry, preserving entry order
    #[must_use]
    pub fn build_registry(&self) -> DriverRegistry {
        let mut registry = DriverRegistry::new();
        for spec in &self.drivers {
            registry.register_boxed(spec.build());
        }
        info!(
            drivers = registry.len(),
            order = ?registry.driver_names(),
            "Built driver registry"
        );
        registry
    }

    /// Build the resolver; `*.mem` references are virtual when a memory driver is configured
    #[must_use]
    pub fn build_resolver(&self) -> LinkResolver {
        let resolver = LinkResolver::new(self.max_link_hops);
        if self.drivers.iter().any(|spec| spec.driver == DriverKind::Mem) {
            resolver.with_virtual_suffix(MEM_EXTENSION)
        } else {
            resolver
        }
    }
}

impl Default for RegistryConfig {
    /// Memory driver for `*.mem`, then local files for everything else
    fn default() -> Self {
        Self::empty()
            .with_driver(DriverSpec::new(
                DriverKind::Mem,
                MatchPredicate::Suffix(MEM_EXTENSION.to_string()),
            ))
            .with_driver(DriverSpec::new(DriverKind::File, MatchPredicate::Any))
    }
}
