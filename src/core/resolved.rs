use serde::Serialize;

use crate::core::reference::SourceReference;

/// The outcome of following a reference through its links
///
/// `hop_chain` starts with the reference that was resolved and ends with the
/// terminal reference. It never contains the same reference twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    terminal: SourceReference,
    hop_chain: Vec<SourceReference>,
}

impl ResolvedReference {
    /// A reference that needed no indirection
    #[must_use]
    pub fn direct(reference: SourceReference) -> Self {
        Self {
            terminal: reference.clone(),
            hop_chain: vec![reference],
        }
    }

    /// `hop_chain` must already end with `terminal`
    pub(crate) fn from_parts(terminal: SourceReference, hop_chain: Vec<SourceReference>) -> Self {
        debug_assert_eq!(hop_chain.last(), Some(&terminal));
        Self {
            terminal,
            hop_chain,
        }
    }

    #[must_use]
    pub fn terminal(&self) -> &SourceReference {
        &self.terminal
    }

    #[must_use]
    pub fn hop_chain(&self) -> &[SourceReference] {
        &self.hop_chain
    }

    /// The reference originally handed to the resolver
    #[must_use]
    pub fn origin(&self) -> &SourceReference {
        &self.hop_chain[0]
    }

    /// Number of steps from the origin to the terminal
    #[must_use]
    pub fn hops(&self) -> usize {
        self.hop_chain.len() - 1
    }

    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.hops() > 0
    }
}

impl std::fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain: Vec<&str> = self
            .hop_chain
            .iter()
            .map(SourceReference::normalized)
            .collect();
        write!(f, "{}", chain.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct() {
        let resolved = ResolvedReference::direct(SourceReference::new("/data/a.gor"));
        assert_eq!(resolved.hops(), 0);
        assert!(!resolved.is_indirect());
        assert_eq!(resolved.hop_chain().len(), 1);
        assert_eq!(resolved.origin(), resolved.terminal());
    }

    #[test]
    fn test_from_parts() {
        let terminal = SourceReference::new("/data/a.gor");
        let resolved = ResolvedReference::from_parts(
            terminal.clone(),
            vec![SourceReference::new("/data/a.gor.link"), terminal],
        );
        assert_eq!(resolved.terminal().normalized(), "/data/a.gor");
        assert_eq!(resolved.origin().normalized(), "/data/a.gor.link");
        assert_eq!(resolved.hops(), 1);
        assert_eq!(resolved.to_string(), "/data/a.gor.link -> /data/a.gor");
    }
}
