//! Centralized limits and helper functions.

use std::path::{Component, Path, PathBuf};

/// Extension that marks a reference as an indirection file
pub const LINK_EXTENSION: &str = ".link";

/// Default number of links followed before resolution gives up
pub const DEFAULT_MAX_LINK_HOPS: usize = 32;

/// Upper bound on the number of hops a configuration may request
pub const MAX_LINK_HOPS_LIMIT: usize = 1024;

/// Largest link file that will be read (DOS protection)
pub const MAX_LINK_FILE_SIZE: usize = 4096;

/// Lexically normalize a path without touching the filesystem.
///
/// Drops `.` segments, folds `name/..` pairs and collapses repeated
/// separators. Leading `..` segments of a relative path are kept, and `..`
/// directly under the root is discarded.
///
/// # Examples
///
/// ```
/// use gor_driver::utils::validation::clean_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(clean_path(Path::new("/data/./a/../b.gor")), PathBuf::from("/data/b.gor"));
/// assert_eq!(clean_path(Path::new("../x//y")), PathBuf::from("../x/y"));
/// assert_eq!(clean_path(Path::new("/../x")), PathBuf::from("/x"));
/// ```
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Check whether a link file of `size` bytes may be read.
///
/// Returns an error message if the size exceeds the maximum, None if safe.
#[must_use]
pub fn check_link_size(size: usize) -> Option<String> {
    if size > MAX_LINK_FILE_SIZE {
        Some(format!(
            "Link file too large: exceeds maximum of {MAX_LINK_FILE_SIZE} bytes"
        ))
    } else {
        None
    }
}

/// Check a configured hop limit.
///
/// Returns an error message if the limit is zero or unreasonably large.
#[must_use]
pub fn check_hop_limit(hops: usize) -> Option<String> {
    if hops == 0 {
        Some("max_link_hops must be at least 1".to_string())
    } else if hops > MAX_LINK_HOPS_LIMIT {
        Some(format!(
            "max_link_hops {hops} exceeds maximum of {MAX_LINK_HOPS_LIMIT}"
        ))
    } else {
        None
    }
}

/// Extract the single target reference from link file content.
///
/// Blank lines and lines starting with `#` are ignored. Returns `Ok(None)`
/// when nothing remains, and an error message when more than one target
/// line is present.
pub fn parse_link_content(content: &str) -> Result<Option<&str>, String> {
    let mut targets = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let Some(first) = targets.next() else {
        return Ok(None);
    };

    if targets.next().is_some() {
        return Err("expected a single target line".to_string());
    }

    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_relative() {
        assert_eq!(clean_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean_path(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_clean_path_keeps_leading_parent() {
        assert_eq!(clean_path(Path::new("../../a")), PathBuf::from("../../a"));
    }

    #[test]
    fn test_check_link_size() {
        assert!(check_link_size(0).is_none());
        assert!(check_link_size(MAX_LINK_FILE_SIZE).is_none());
        assert!(check_link_size(MAX_LINK_FILE_SIZE + 1).is_some());
    }

    #[test]
    fn test_check_hop_limit() {
        assert!(check_hop_limit(0).is_some());
        assert!(check_hop_limit(1).is_none());
        assert!(check_hop_limit(DEFAULT_MAX_LINK_HOPS).is_none());
        assert!(check_hop_limit(MAX_LINK_HOPS_LIMIT + 1).is_some());
    }

    #[test]
    fn test_parse_link_content_single_line() {
        assert_eq!(
            parse_link_content("  /data/genes.gor \n"),
            Ok(Some("/data/genes.gor"))
        );
    }

    #[test]
    fn test_parse_link_content_skips_comments() {
        let content = "# written by pipeline\n\n/data/genes.gor\n# trailing\n";
        assert_eq!(parse_link_content(content), Ok(Some("/data/genes.gor")));
    }

    #[test]
    fn test_parse_link_content_empty() {
        assert_eq!(parse_link_content(""), Ok(None));
        assert_eq!(parse_link_content("# only a comment\n  \n"), Ok(None));
    }

    #[test]
    fn test_parse_link_content_multiple_targets() {
        assert!(parse_link_content("/a.gor\n/b.gor\n").is_err());
    }
}
