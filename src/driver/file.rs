//! Driver for local files.
//!
//! Paths ending in `.gz` or `.bgz` are read through a multi-member gzip
//! decoder, so bgzip-compressed files decode in full.

use flate2::read::MultiGzDecoder;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::core::error::SourceError;
use crate::core::handle::ResourceHandle;
use crate::core::reference::{ReferenceKind, SourceReference};
use crate::core::resolved::ResolvedReference;
use crate::core::source::{Capability, DataSource};
use crate::driver::SourceDriver;
use crate::iterator::{GenomicIterator, LineIterator};

const FILE_CAPABILITIES: &[Capability] = &[Capability::Exists, Capability::Open, Capability::Iterate];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("gz" | "bgz") => Self::Gzip,
            _ => Self::None,
        }
    }
}

/// Reads local files
#[derive(Debug, Default, Clone)]
pub struct FileDriver;

impl FileDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SourceDriver for FileDriver {
    fn name(&self) -> &str {
        "file"
    }

    fn can_handle(&self, reference: &SourceReference) -> bool {
        !reference.normalized().is_empty()
            && matches!(reference.kind(), ReferenceKind::Path | ReferenceKind::Link)
    }

    fn open(&self, resolved: &ResolvedReference) -> Result<Box<dyn DataSource>, SourceError> {
        let terminal = resolved.terminal();
        let path = terminal.path().ok_or_else(|| SourceError::Open {
            reference: terminal.normalized().to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a local path"),
        })?;

        Ok(Box::new(FileSource::new(resolved.clone(), path.to_path_buf())))
    }
}

/// A reader that owns exactly one handle
pub struct SourceReader {
    inner: ReaderKind,
}

enum ReaderKind {
    Plain(ResourceHandle),
    Gzip(MultiGzDecoder<ResourceHandle>),
}

impl SourceReader {
    fn open(path: &Path, compression: Compression) -> io::Result<Self> {
        let handle = ResourceHandle::open(path)?;
        let inner = match compression {
            Compression::None => ReaderKind::Plain(handle),
            Compression::Gzip => ReaderKind::Gzip(MultiGzDecoder::new(handle)),
        };
        Ok(Self { inner })
    }

    #[must_use]
    pub fn handle(&self) -> &ResourceHandle {
        match &self.inner {
            ReaderKind::Plain(handle) => handle,
            ReaderKind::Gzip(decoder) => decoder.get_ref(),
        }
    }

    pub fn close(&mut self) {
        match &mut self.inner {
            ReaderKind::Plain(handle) => handle.close(),
            ReaderKind::Gzip(decoder) => decoder.get_mut().close(),
        }
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            ReaderKind::Plain(handle) => handle.read(buf),
            ReaderKind::Gzip(decoder) => decoder.read(buf),
        }
    }
}

impl std::fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReader")
            .field("handle", self.handle())
            .finish()
    }
}

/// A local file, plain or gzip-compressed
#[derive(Debug)]
pub struct FileSource {
    resolved: ResolvedReference,
    path: PathBuf,
    compression: Compression,
    reader: Option<SourceReader>,
}

impl FileSource {
    #[must_use]
    pub fn new(resolved: ResolvedReference, path: PathBuf) -> Self {
        let compression = Compression::from_path(&path);
        Self {
            resolved,
            path,
            compression,
            reader: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn acquire_reader(&self) -> Result<SourceReader, SourceError> {
        SourceReader::open(&self.path, self.compression).map_err(|source| SourceError::Open {
            reference: self.name().to_string(),
            source,
        })
    }
}

impl DataSource for FileSource {
    fn reference(&self) -> &ResolvedReference {
        &self.resolved
    }

    fn capabilities(&self) -> &'static [Capability] {
        FILE_CAPABILITIES
    }

    fn exists(&self) -> Result<bool, SourceError> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SourceError::Open {
                reference: self.name().to_string(),
                source,
            }),
        }
    }

    fn open(&mut self) -> Result<&mut dyn Read, SourceError> {
        self.close();
        let reader = self.acquire_reader()?;
        let reader: &mut dyn Read = self.reader.insert(reader);
        Ok(reader)
    }

    fn into_iterator(self: Box<Self>) -> Result<Box<dyn GenomicIterator>, SourceError> {
        let reader = self.acquire_reader()?;
        let iterator = LineIterator::new(self, BufReader::new(reader))?;
        Ok(Box::new(iterator))
    }

    fn open_handle_count(&self) -> usize {
        self.reader
            .as_ref()
            .map_or(0, |reader| usize::from(reader.handle().is_open()))
    }

    fn close(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.close();
        }
    }
}

impl Drop for FileSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Write;

    const GOR: &str = "#Chrom\tPos\tRef\nchr1\t10\tA\nchr1\t20\tC\n";

    fn resolved(path: &Path) -> ResolvedReference {
        ResolvedReference::direct(SourceReference::new(path.to_string_lossy()))
    }

    #[test]
    fn test_can_handle() {
        let driver = FileDriver::new();
        assert!(driver.can_handle(&SourceReference::new("/data/genes.gor")));
        assert!(driver.can_handle(&SourceReference::new("file:///data/genes.gor")));
        assert!(driver.can_handle(&SourceReference::new("/data/genes.gor.link")));
        assert!(!driver.can_handle(&SourceReference::new("https://example.org/genes.gor")));
        assert!(!driver.can_handle(&SourceReference::new("")));
    }

    #[test]
    fn test_compression_from_path() {
        assert_eq!(Compression::from_path(Path::new("a.gor")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("a.gor.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.GOR.BGZ")), Compression::Gzip);
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gor");
        fs::write(&path, GOR).unwrap();

        let source = FileDriver::new().open(&resolved(&path)).unwrap();
        assert!(source.exists().unwrap());
        assert_eq!(source.open_handle_count(), 0);

        let missing = FileDriver::new()
            .open(&resolved(&dir.path().join("missing.gor")))
            .unwrap();
        assert!(!missing.exists().unwrap());
    }

    #[test]
    fn test_directory_does_not_exist_as_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileDriver::new().open(&resolved(dir.path())).unwrap();
        assert!(!source.exists().unwrap());
    }

    #[test]
    fn test_open_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gor");
        fs::write(&path, GOR).unwrap();

        let mut source = FileDriver::new().open(&resolved(&path)).unwrap();
        let mut content = String::new();
        source.open().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, GOR);
        assert_eq!(source.open_handle_count(), 1);

        source.close();
        assert_eq!(source.open_handle_count(), 0);
        source.close();
        assert_eq!(source.open_handle_count(), 0);
    }

    #[test]
    fn test_reopen_releases_previous_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gor");
        fs::write(&path, GOR).unwrap();

        let mut source = FileDriver::new().open(&resolved(&path)).unwrap();
        source.open().unwrap();
        source.open().unwrap();
        assert_eq!(source.open_handle_count(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileDriver::new()
            .open(&resolved(&dir.path().join("missing.gor")))
            .unwrap();

        let Err(err) = source.open() else {
            panic!("missing file opened");
        };
        assert!(matches!(err, SourceError::Open { .. }));
        assert_eq!(source.open_handle_count(), 0);
    }

    #[test]
    fn test_gzip_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gor.gz");
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(GOR.as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let mut source = FileDriver::new().open(&resolved(&path)).unwrap();
        let mut content = String::new();
        source.open().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, GOR);
    }

    #[test]
    fn test_iterate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gor");
        fs::write(&path, GOR).unwrap();

        let source = FileDriver::new().open(&resolved(&path)).unwrap();
        let mut iterator = source.into_iterator().unwrap();
        assert_eq!(iterator.header(), &["Chrom", "Pos", "Ref"]);

        let rows: Vec<_> = iterator.by_ref().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].position, 20);
        iterator.close();
    }
}
