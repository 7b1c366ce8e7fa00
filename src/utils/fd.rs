//! Descriptor accounting for leak checks.
//!
//! Not used on the data path. Tests and the verbose CLI compare counts taken
//! before and after a batch of operations.

use std::io;

/// Count the file descriptors currently open in this process.
///
/// The directory listing itself holds one descriptor while counting, so
/// two counts taken the same way are directly comparable.
///
/// # Errors
///
/// Returns an error if the descriptor directory cannot be listed, or
/// `io::ErrorKind::Unsupported` on platforms without one.
pub fn count_open_files() -> io::Result<usize> {
    match descriptor_dir() {
        Some(dir) => Ok(std::fs::read_dir(dir)?.count()),
        None => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "open file counting is not supported on this platform",
        )),
    }
}

#[cfg(target_os = "linux")]
fn descriptor_dir() -> Option<&'static str> {
    Some("/proc/self/fd")
}

#[cfg(all(unix, not(target_os = "linux")))]
fn descriptor_dir() -> Option<&'static str> {
    Some("/dev/fd")
}

#[cfg(not(unix))]
fn descriptor_dir() -> Option<&'static str> {
    None
}
