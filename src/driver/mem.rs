//! Driver for synthetic in-memory data.
//!
//! A reference such as `1.mem` yields `rows_per_chromosome` rows for every
//! configured chromosome, with a single `data` column holding the file stem.
//! Nothing touches the filesystem, which makes these sources useful for
//! wiring tests and for exercising iterators without fixtures.

use serde::{Deserialize, Serialize};

use crate::core::error::SourceError;
use crate::core::reference::{ReferenceKind, SourceReference};
use crate::core::resolved::ResolvedReference;
use crate::core::row::Row;
use crate::core::source::{Capability, DataSource};
use crate::driver::SourceDriver;
use crate::iterator::GenomicIterator;

pub const MEM_EXTENSION: &str = ".mem";

const MEM_CAPABILITIES: &[Capability] = &[Capability::Exists, Capability::Iterate];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemOptions {
    #[serde(default = "default_chromosomes")]
    pub chromosomes: Vec<String>,

    #[serde(default = "default_rows_per_chromosome")]
    pub rows_per_chromosome: u64,
}

fn default_chromosomes() -> Vec<String> {
    vec!["chr1".to_string(), "chr2".to_string(), "chr3".to_string()]
}

fn default_rows_per_chromosome() -> u64 {
    10
}

impl Default for MemOptions {
    fn default() -> Self {
        Self {
            chromosomes: default_chromosomes(),
            rows_per_chromosome: default_rows_per_chromosome(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemDriver {
    options: MemOptions,
}

impl MemDriver {
    #[must_use]
    pub fn new(options: MemOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &MemOptions {
        &self.options
    }
}

impl SourceDriver for MemDriver {
    fn name(&self) -> &str {
        "mem"
    }

    fn can_handle(&self, reference: &SourceReference) -> bool {
        reference.kind() == ReferenceKind::Path && reference.normalized().ends_with(MEM_EXTENSION)
    }

    fn open(&self, resolved: &ResolvedReference) -> Result<Box<dyn DataSource>, SourceError> {
        Ok(Box::new(MemSource {
            resolved: resolved.clone(),
            options: self.options.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct MemSource {
    resolved: ResolvedReference,
    options: MemOptions,
}

impl MemSource {
    fn stem(&self) -> String {
        let name = self.name();
        let file_name = name.rsplit('/').next().unwrap_or(name);
        file_name
            .strip_suffix(MEM_EXTENSION)
            .unwrap_or(file_name)
            .to_string()
    }
}

impl DataSource for MemSource {
    fn reference(&self) -> &ResolvedReference {
        &self.resolved
    }

    fn capabilities(&self) -> &'static [Capability] {
        MEM_CAPABILITIES
    }

    fn exists(&self) -> Result<bool, SourceError> {
        Ok(true)
    }

    fn into_iterator(self: Box<Self>) -> Result<Box<dyn GenomicIterator>, SourceError> {
        let stem = self.stem();
        Ok(Box::new(MemIterator::new(self.options.clone(), stem)))
    }

    fn open_handle_count(&self) -> usize {
        0
    }

    fn close(&mut self) {}
}

/// Generates rows chromosome by chromosome, positions `1..=rows_per_chromosome`
#[derive(Debug)]
pub struct MemIterator {
    header: Vec<String>,
    options: MemOptions,
    value: String,
    chromosome: usize,
    position: u64,
    closed: bool,
}

impl MemIterator {
    #[must_use]
    pub fn new(options: MemOptions, value: String) -> Self {
        Self {
            header: vec!["chrom".to_string(), "pos".to_string(), "data".to_string()],
            options,
            value,
            chromosome: 0,
            position: 0,
            closed: false,
        }
    }
}

impl Iterator for MemIterator {
    type Item = Result<Row, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.closed {
            let Some(chromosome) = self.options.chromosomes.get(self.chromosome) else {
                self.closed = true;
                break;
            };

            if self.position < self.options.rows_per_chromosome {
                self.position += 1;
                return Some(Ok(Row::new(
                    chromosome.as_str(),
                    self.position,
                    &[self.value.as_str()],
                )));
            }

            self.chromosome += 1;
            self.position = 0;
        }
        None
    }
}

impl GenomicIterator for MemIterator {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
