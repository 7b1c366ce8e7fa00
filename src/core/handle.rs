//! Explicitly released wrappers around OS file descriptors.
//!
//! Every [`ResourceHandle`] is counted in a process-wide ledger from the
//! moment it is acquired until it is closed, whether that happens through
//! [`ResourceHandle::close`] or on drop. Leak tests compare
//! [`live_handle_count`] before and after a workload.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::trace;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);
static LIVE_HANDLES: AtomicUsize = AtomicUsize::new(0);

/// Number of handles acquired by this process and not yet released
#[must_use]
pub fn live_handle_count() -> usize {
    LIVE_HANDLES.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Open,
    Closed,
}

/// A single open file with an idempotent, explicit release
#[derive(Debug)]
pub struct ResourceHandle {
    id: u64,
    path: PathBuf,
    file: Option<File>,
}

impl ResourceHandle {
    /// Acquire a read-only descriptor for `path`
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened. Nothing
    /// is acquired in that case.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
        LIVE_HANDLES.fetch_add(1, Ordering::SeqCst);
        trace!(handle = id, path = %path.display(), "Acquired handle");

        Ok(Self {
            id,
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn state(&self) -> HandleState {
        if self.file.is_some() {
            HandleState::Open
        } else {
            HandleState::Closed
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == HandleState::Open
    }

    /// Release the descriptor. Calling this again has no effect.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            LIVE_HANDLES.fetch_sub(1, Ordering::SeqCst);
            trace!(handle = self.id, path = %self.path.display(), "Released handle");
        }
    }
}

impl Read for ResourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("handle {} for '{}' is closed", self.id, self.path.display()),
            )),
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.close();
    }
}
