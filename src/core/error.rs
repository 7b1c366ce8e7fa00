use thiserror::Error;

use crate::core::source::Capability;

/// Failures while following link indirection
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Link cycle detected at '{reference}' (chain: {})", .chain.join(" -> "))]
    Cycle {
        reference: String,
        chain: Vec<String>,
    },

    #[error("Link target not found: {reference}")]
    MissingTarget { reference: String },

    #[error("Link chain exceeds maximum of {limit} hops at '{reference}'")]
    HopLimitExceeded { reference: String, limit: usize },

    #[error("Link file is empty: {reference}")]
    EmptyLink { reference: String },

    #[error("Malformed link file '{reference}': {message}")]
    MalformedLink { reference: String, message: String },

    #[error("Failed to read link '{reference}': {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the driver framework
///
/// None of these are retried internally. Resolution and opening are
/// idempotent, so callers may retry explicitly.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("No registered driver can handle '{reference}'")]
    NoApplicableDriver { reference: String },

    #[error("Failed to open '{reference}': {source}")]
    Open {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Source '{reference}' does not support {capability}")]
    UnsupportedCapability {
        reference: String,
        capability: Capability,
    },

    #[error("Source '{reference}' cannot be iterated")]
    NotIterable { reference: String },

    #[error("Invalid row in '{reference}' at line {line}: {message}")]
    Record {
        reference: String,
        line: usize,
        message: String,
    },

    #[error("Failed to read '{reference}': {source}")]
    Read {
        reference: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = ResolutionError::Cycle {
            reference: "/a.link".to_string(),
            chain: vec!["/a.link".to_string(), "/b.link".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Link cycle detected at '/a.link' (chain: /a.link -> /b.link)"
        );
    }

    #[test]
    fn test_resolution_error_is_transparent() {
        let err: SourceError = ResolutionError::MissingTarget {
            reference: "/missing.link".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Link target not found: /missing.link");
    }
}
