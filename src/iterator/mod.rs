//! Forward-only row iteration over opened sources.
//!
//! An iterator owns the source it reads from. Handles are released when the
//! iterator is exhausted, hits an error, is closed, or is dropped, whichever
//! comes first: the reader goes first, then the source.

use std::io::BufRead;

use crate::core::error::SourceError;
use crate::core::row::Row;
use crate::core::source::DataSource;

/// A lazy, non-restartable sequence of rows
pub trait GenomicIterator: Iterator<Item = Result<Row, SourceError>> + Send {
    /// Column names from the header line, empty if the data had none
    fn header(&self) -> &[String];

    /// Release everything the iterator holds. Calling this again has no effect.
    fn close(&mut self);
}

/// Iterates tab-separated rows from a line reader
///
/// Lines starting with `#` before the first row form the header (the last
/// such line wins); blank lines are skipped.
#[derive(Debug)]
pub struct LineIterator<R> {
    name: String,
    header: Vec<String>,
    lines: Option<R>,
    source: Option<Box<dyn DataSource>>,
    pending: Option<(usize, String)>,
    line_number: usize,
}

impl<R: BufRead + Send> LineIterator<R> {
    /// Take ownership of `source` and `lines`, reading the header eagerly
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Read` if the header cannot be read. The reader
    /// and source are released before the error is returned.
    pub fn new(source: Box<dyn DataSource>, lines: R) -> Result<Self, SourceError> {
        let mut iterator = Self {
            name: source.name().to_string(),
            header: Vec::new(),
            lines: Some(lines),
            source: Some(source),
            pending: None,
            line_number: 0,
        };

        loop {
            match iterator.read_line()? {
                Some(line) => {
                    if let Some(header) = line.strip_prefix('#') {
                        iterator.header = header.split('\t').map(str::to_string).collect();
                    } else if !line.trim().is_empty() {
                        iterator.pending = Some((iterator.line_number, line));
                        break;
                    }
                }
                None => break,
            }
        }

        Ok(iterator)
    }

    fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        let mut buf = String::new();
        let read = lines.read_line(&mut buf).map_err(|source| SourceError::Read {
            reference: self.name.clone(),
            source,
        })?;

        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        let trimmed_len = buf.trim_end_matches(|c| c == '\n' || c == '\r').len();
        buf.truncate(trimmed_len);
        Ok(Some(buf))
    }

    fn next_data_line(&mut self) -> Result<Option<(usize, String)>, SourceError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        while let Some(line) = self.read_line()? {
            if !line.trim().is_empty() {
                return Ok(Some((self.line_number, line)));
            }
        }
        Ok(None)
    }
}

impl<R: BufRead + Send> Iterator for LineIterator<R> {
    type Item = Result<Row, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_data_line() {
            Ok(Some((line_number, line))) => match Row::parse(&line) {
                Ok(row) => Some(Ok(row)),
                Err(message) => {
                    self.close();
                    Some(Err(SourceError::Record {
                        reference: self.name.clone(),
                        line: line_number,
                        message,
                    }))
                }
            },
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead + Send> GenomicIterator for LineIterator<R> {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn close(&mut self) {
        self.pending = None;
        self.lines = None;
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}

impl<R> Drop for LineIterator<R> {
    fn drop(&mut self) {
        self.lines = None;
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}
