//! Command-line interface for gor-driver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **resolve**: Follow links from a reference and report the chosen driver
//! - **cat**: Stream rows from a reference
//! - **drivers**: List configured drivers in dispatch order
//! - **config**: Print the effective driver configuration
//!
//! ## Usage
//!
//! ```text
//! # Where does a link point?
//! gor-driver resolve /data/genes.gor.link
//!
//! # Check for descriptor leaks over repeated resolution
//! gor-driver resolve /data/genes.gor.link --repeat 1000 --verbose
//!
//! # First rows of a compressed file
//! gor-driver cat /data/variants.gor.gz -n 5 --header
//!
//! # Use a custom driver configuration
//! gor-driver --config drivers.json drivers
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::provider::SourceProvider;
use crate::registry::config::RegistryConfig;

pub mod cat;
pub mod config;
pub mod drivers;
pub mod resolve;

#[derive(Parser)]
#[command(name = "gor-driver")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Resolve and open genomic data sources through pluggable drivers")]
#[command(
    long_about = "gor-driver turns a reference (a path, a URI, or a .link indirection file) into an opened data source.\n\nIt follows link files to their target, picks the first configured driver that accepts the reference, and releases every file descriptor it acquires."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a driver configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a reference through its links
    Resolve(resolve::ResolveArgs),

    /// Print rows from a reference
    Cat(cat::CatArgs),

    /// List configured drivers
    Drivers,

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the configuration from `path`, or fall back to the built-in default
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RegistryConfig> {
    match path {
        Some(path) => Ok(RegistryConfig::load_from_file(path)?),
        None => Ok(RegistryConfig::default()),
    }
}

/// Build a provider from the configuration selected on the command line
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub fn build_provider(path: Option<&Path>) -> anyhow::Result<SourceProvider> {
    let config = load_config(path)?;
    Ok(SourceProvider::from_config(&config)?)
}
