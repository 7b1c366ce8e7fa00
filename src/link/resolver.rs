use std::collections::HashSet;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::core::error::ResolutionError;
use crate::core::handle::ResourceHandle;
use crate::core::reference::SourceReference;
use crate::core::resolved::ResolvedReference;
use crate::utils::validation::{
    check_link_size, parse_link_content, DEFAULT_MAX_LINK_HOPS, MAX_LINK_FILE_SIZE,
};

/// Follows link files until a reference designates concrete data
#[derive(Debug, Clone)]
pub struct LinkResolver {
    max_hops: usize,
    virtual_suffixes: Vec<String>,
}

/// What the filesystem says about a local, non-link reference
enum Local {
    Present,
    Missing,
    Fallback(SourceReference),
}

impl LinkResolver {
    #[must_use]
    pub fn new(max_hops: usize) -> Self {
        Self {
            max_hops,
            virtual_suffixes: Vec::new(),
        }
    }

    /// Treat references ending in `suffix` as served without backing files
    ///
    /// Such references are always terminal: they are never checked on disk
    /// and never redirected to a `<path>.link` sibling.
    #[must_use]
    pub fn with_virtual_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.virtual_suffixes.push(suffix.into());
        self
    }

    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    #[must_use]
    pub fn is_virtual(&self, reference: &SourceReference) -> bool {
        reference.scheme().is_none()
            && self
                .virtual_suffixes
                .iter()
                .any(|suffix| reference.normalized().ends_with(suffix.as_str()))
    }

    /// Resolve `reference` to its terminal reference
    ///
    /// Each link read acquires one handle and releases it before the next
    /// hop, so no handle survives the call on any path. Every step that
    /// extends the hop chain, fallback steps included, counts against
    /// `max_hops`.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Cycle` if a reference repeats,
    /// `ResolutionError::HopLimitExceeded` if more than `max_hops` steps
    /// would be taken, `ResolutionError::MissingTarget` if a link file or
    /// the local file a link points at does not exist, and `EmptyLink`,
    /// `MalformedLink` or `Io` if a link file cannot be read or parsed.
    pub fn resolve(
        &self,
        reference: &SourceReference,
    ) -> Result<ResolvedReference, ResolutionError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut chain: Vec<SourceReference> = Vec::new();
        let mut current = reference.clone();

        loop {
            if !visited.insert(current.normalized().to_string()) {
                let mut names: Vec<String> =
                    chain.iter().map(|r| r.normalized().to_string()).collect();
                names.push(current.normalized().to_string());
                return Err(ResolutionError::Cycle {
                    reference: current.normalized().to_string(),
                    chain: names,
                });
            }
            chain.push(current.clone());
            let arrived_by_link = chain.len() > 1;

            let next = if current.is_link() {
                self.check_budget(&current, &chain)?;
                let target = read_link(&current)?;
                debug!(link = %current, target = %target, "Followed link");
                Some(target)
            } else if self.is_virtual(&current) {
                None
            } else {
                match locate(&current) {
                    Local::Present => None,
                    Local::Missing if arrived_by_link => {
                        return Err(ResolutionError::MissingTarget {
                            reference: current.normalized().to_string(),
                        });
                    }
                    // A direct reference to a missing file is opened lazily
                    Local::Missing => None,
                    Local::Fallback(sibling) => {
                        self.check_budget(&current, &chain)?;
                        debug!(reference = %current, link = %sibling, "Using fallback link");
                        Some(sibling)
                    }
                }
            };

            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        debug!(
            reference = %reference,
            terminal = %current,
            hops = chain.len() - 1,
            "Resolved reference"
        );
        Ok(ResolvedReference::from_parts(current, chain))
    }

    /// Fail if taking one more step from `current` would exceed `max_hops`
    fn check_budget(
        &self,
        current: &SourceReference,
        chain: &[SourceReference],
    ) -> Result<(), ResolutionError> {
        if chain.len() > self.max_hops {
            return Err(ResolutionError::HopLimitExceeded {
                reference: current.normalized().to_string(),
                limit: self.max_hops,
            });
        }
        Ok(())
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINK_HOPS)
    }
}

/// A missing local path whose `<path>.link` sibling exists falls back to the sibling
fn locate(reference: &SourceReference) -> Local {
    let Some(path) = reference.path() else {
        return Local::Present;
    };
    if path.exists() {
        return Local::Present;
    }

    match reference.link_sibling() {
        Some(sibling) if sibling.path().is_some_and(Path::is_file) => Local::Fallback(sibling),
        _ => Local::Missing,
    }
}

/// Read the target of a link file, releasing the handle before parsing
fn read_link(link: &SourceReference) -> Result<SourceReference, ResolutionError> {
    let name = || link.normalized().to_string();
    let path = link
        .path()
        .ok_or_else(|| ResolutionError::MissingTarget { reference: name() })?;

    let mut handle = ResourceHandle::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ResolutionError::MissingTarget { reference: name() },
        _ => ResolutionError::Io {
            reference: name(),
            source: e,
        },
    })?;

    let mut bytes = Vec::new();
    let read = handle
        .by_ref()
        .take(MAX_LINK_FILE_SIZE as u64 + 1)
        .read_to_end(&mut bytes);
    handle.close();
    read.map_err(|e| ResolutionError::Io {
        reference: name(),
        source: e,
    })?;

    if let Some(message) = check_link_size(bytes.len()) {
        return Err(ResolutionError::MalformedLink {
            reference: name(),
            message,
        });
    }

    let content = String::from_utf8(bytes).map_err(|_| ResolutionError::MalformedLink {
        reference: name(),
        message: "content is not valid UTF-8".to_string(),
    })?;

    let target = parse_link_content(&content)
        .map_err(|message| ResolutionError::MalformedLink {
            reference: name(),
            message,
        })?
        .ok_or_else(|| ResolutionError::EmptyLink { reference: name() })?;

    Ok(match path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => SourceReference::with_context(target, dir),
        None => SourceReference::new(target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn reference(path: &Path) -> SourceReference {
        SourceReference::new(path.to_string_lossy())
    }

    #[test]
    fn test_direct_reference() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "genes.gor", "chrom\tpos\n");

        let resolved = LinkResolver::default().resolve(&reference(&data)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(resolved.hop_chain().len(), 1);
    }

    #[test]
    fn test_single_link() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "genes.gor", "chrom\tpos\n");
        let link = write(&dir, "genes.gor.link", &data.to_string_lossy());

        let resolved = LinkResolver::default().resolve(&reference(&link)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(
            resolved.hop_chain(),
            &[reference(&link), reference(&data)][..]
        );
    }

    #[test]
    fn test_chained_relative_links() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("store")).unwrap();
        let data = write(&dir, "store/genes.gor", "chrom\tpos\n");
        write(&dir, "store/latest.link", "genes.gor\n");
        let outer = write(&dir, "genes.link", "# current release\nstore/latest.link\n");

        let resolved = LinkResolver::default().resolve(&reference(&outer)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(resolved.hops(), 2);

        let unique: HashSet<_> = resolved.hop_chain().iter().collect();
        assert_eq!(unique.len(), resolved.hop_chain().len());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "genes.gor", "");
        let link = write(&dir, "genes.gor.link", &data.to_string_lossy());

        let resolver = LinkResolver::default();
        let first = resolver.resolve(&reference(&link)).unwrap();
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&reference(&link)).unwrap(), first);
        }
    }

    #[test]
    fn test_cycle_detected() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "a.link", "b.link");
        let b = write(&dir, "b.link", "a.link");

        let err = LinkResolver::default().resolve(&reference(&b)).unwrap_err();
        match err {
            ResolutionError::Cycle { reference, chain } => {
                assert!(reference.ends_with("b.link"));
                assert_eq!(chain.len(), 3);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle_detected() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "self.link", "self.link");

        let err = LinkResolver::default().resolve(&reference(&link)).unwrap_err();
        assert!(matches!(err, ResolutionError::Cycle { .. }));
    }

    #[test]
    fn test_hop_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "data.gor", "");
        write(&dir, "c.link", "data.gor");
        write(&dir, "b.link", "c.link");
        let a = write(&dir, "a.link", "b.link");

        let err = LinkResolver::new(2).resolve(&reference(&a)).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::HopLimitExceeded { limit: 2, .. }
        ));

        let resolved = LinkResolver::new(3).resolve(&reference(&a)).unwrap();
        assert_eq!(resolved.hops(), 3);
    }

    #[test]
    fn test_missing_link_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("missing.link");

        let err = LinkResolver::default()
            .resolve(&reference(&link))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MissingTarget { .. }));
    }

    #[test]
    fn test_empty_link_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "empty.link", "  \n# nothing here\n");

        let err = LinkResolver::default()
            .resolve(&reference(&link))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::EmptyLink { .. }));
    }

    #[test]
    fn test_link_with_two_targets() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "two.link", "a.gor\nb.gor\n");

        let err = LinkResolver::default()
            .resolve(&reference(&link))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedLink { .. }));
    }

    #[test]
    fn test_oversized_link_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "big.link", &"x".repeat(MAX_LINK_FILE_SIZE + 10));

        let err = LinkResolver::default()
            .resolve(&reference(&link))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedLink { .. }));
    }

    #[test]
    fn test_fallback_link_for_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("v2")).unwrap();
        let data = write(&dir, "v2/genes.gor", "");
        let missing = dir.path().join("genes.gor");
        write(&dir, "genes.gor.link", "v2/genes.gor");

        let resolved = LinkResolver::default()
            .resolve(&reference(&missing))
            .unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(resolved.hop_chain().len(), 3);
        assert_eq!(resolved.hops(), 2);
    }

    #[test]
    fn test_missing_path_without_fallback_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing.gor");

        let resolved = LinkResolver::default()
            .resolve(&reference(&missing))
            .unwrap();
        assert_eq!(resolved.terminal(), &reference(&missing));
    }

    #[test]
    fn test_fallback_steps_count_against_hop_limit() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "t.gor", "");
        write(&dir, "p1.gor.link", "p2.gor");
        write(&dir, "p2.gor.link", "t.gor");
        let origin = dir.path().join("p1.gor");

        let err = LinkResolver::new(2)
            .resolve(&reference(&origin))
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::HopLimitExceeded { limit: 2, .. }
        ));

        let resolved = LinkResolver::new(4).resolve(&reference(&origin)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(resolved.hops(), 4);
    }

    #[test]
    fn test_link_to_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "dangling.link", "gone.gor");

        let err = LinkResolver::default()
            .resolve(&reference(&link))
            .unwrap_err();
        match err {
            ResolutionError::MissingTarget { reference } => assert!(reference.ends_with("gone.gor")),
            other => panic!("expected missing target, got {other:?}"),
        }
    }

    #[test]
    fn test_link_to_missing_file_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "real.gor", "");
        write(&dir, "moved.gor.link", "real.gor");
        let link = write(&dir, "genes.link", "moved.gor");

        let resolved = LinkResolver::default().resolve(&reference(&link)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&data));
        assert_eq!(resolved.hops(), 3);
    }

    #[test]
    fn test_virtual_references() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(&dir, "sample.link", "7.mem");
        let stray = write(&dir, "1.mem.link", "genes.gor");
        let resolver = LinkResolver::default().with_virtual_suffix(".mem");

        let resolved = resolver.resolve(&reference(&link)).unwrap();
        assert_eq!(resolved.terminal(), &reference(&dir.path().join("7.mem")));

        // Not redirected through a sibling link
        let direct = reference(&dir.path().join("1.mem"));
        let resolved = resolver.resolve(&direct).unwrap();
        assert_eq!(resolved.terminal(), &direct);
        assert!(!resolved.is_indirect());
        assert!(stray.exists());

        // Without the suffix, the missing file is an error
        let err = LinkResolver::default().resolve(&reference(&link)).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingTarget { .. }));
    }

    #[test]
    fn test_url_is_terminal() {
        let r = SourceReference::new("https://example.org/genes.gor.link");
        let resolved = LinkResolver::default().resolve(&r).unwrap();
        assert_eq!(resolved.terminal(), &r);
    }
}
