use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::utils::validation::{clean_path, LINK_EXTENSION};

/// What a reference designates, inferred from its normalized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Local filesystem path to concrete data
    Path,
    /// Local indirection file whose content is another reference
    Link,
    /// Remote or otherwise scheme-qualified location (`http://`, `s3://`, ...)
    Url { scheme: String },
}

/// An immutable description of where data lives
///
/// Two references are equal when their normalized forms are equal, no matter
/// how they were spelled by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReference {
    /// Reference exactly as supplied
    raw: String,

    /// Canonical form used for equality, hashing and opening
    normalized: String,

    /// Directory that anchors a relative path
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<PathBuf>,
}

impl SourceReference {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw, None);
        Self {
            raw,
            normalized,
            context: None,
        }
    }

    /// Create a reference whose relative path is anchored at `context`
    pub fn with_context(raw: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        let raw = raw.into();
        let context = context.into();
        let normalized = normalize(&raw, Some(&context));
        Self {
            raw,
            normalized,
            context: Some(context),
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    /// URI scheme, if the reference carries one (`file://` is stripped during normalization)
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        split_scheme(&self.normalized).map(|(scheme, _)| scheme)
    }

    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        if let Some(scheme) = self.scheme() {
            ReferenceKind::Url {
                scheme: scheme.to_lowercase(),
            }
        } else if self.normalized.ends_with(LINK_EXTENSION) {
            ReferenceKind::Link
        } else {
            ReferenceKind::Path
        }
    }

    #[must_use]
    pub fn is_link(&self) -> bool {
        self.kind() == ReferenceKind::Link
    }

    /// Filesystem path for local references
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self.kind() {
            ReferenceKind::Path | ReferenceKind::Link => Some(Path::new(&self.normalized)),
            ReferenceKind::Url { .. } => None,
        }
    }

    /// The `<path>.link` file that stands in for a missing local path
    #[must_use]
    pub fn link_sibling(&self) -> Option<Self> {
        match self.kind() {
            ReferenceKind::Path if !self.normalized.is_empty() => {
                Some(Self::new(format!("{}{LINK_EXTENSION}", self.normalized)))
            }
            _ => None,
        }
    }
}

impl PartialEq for SourceReference {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for SourceReference {}

impl Hash for SourceReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl std::fmt::Display for SourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl From<&str> for SourceReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SourceReference {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

fn normalize(raw: &str, context: Option<&Path>) -> String {
    let trimmed = raw.trim();
    let local = trimmed.strip_prefix("file://").unwrap_or(trimmed);

    if local.is_empty() || split_scheme(local).is_some() {
        return local.to_string();
    }

    let path = Path::new(local);
    let anchored = match context {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };

    clean_path(&anchored).to_string_lossy().into_owned()
}

/// Split `scheme://rest`; single-letter schemes are treated as drive letters
fn split_scheme(s: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = s.split_once("://")?;
    let valid = scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}
