//! Error types for tunespace
//!
//! A single `thiserror` enum covers every caller-input-driven failure:
//! parse errors from the literal parser, structural specification errors
//! from the validator, enumeration of non-finite domains, and overlapping
//! operands of the domain algebra. All errors are raised eagerly at the
//! offending operation; none are deferred or downgraded.

use thiserror::Error;

use crate::path::AxisPath;

/// Result type alias for tunespace operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Main error type for domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Textual input is not a restricted literal (identifiers, calls and
    /// any other executable syntax are rejected before validation runs)
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A mapping was required but some other shape was supplied
    #[error("expected a mapping, found {found}")]
    NotAMapping { found: String },

    /// Mapping keys must be strings
    #[error("domain keys must be strings, found key {key}")]
    NonStringKey { key: String },

    /// Leaf shape violates the domain grammar
    #[error("invalid leaf at '{path}': {reason}")]
    InvalidLeaf { path: AxisPath, reason: String },

    /// A container value was nested directly inside a finite set
    #[error("finite set at '{path}' contains a container value; set elements must be scalars")]
    ContainerInSet { path: AxisPath },

    /// A path is claimed both as a branch and as a leaf, or twice over
    #[error("conflicting placement at '{path}': path is already occupied")]
    PathConflict { path: AxisPath },

    /// Enumeration requested for a domain with a continuous axis
    #[error("domain is not iterable: axis '{axis}' is a continuous range")]
    NotIterable { axis: AxisPath },

    /// Disjoint union of domains whose path sets overlap
    #[error("domains overlap at '{path}'")]
    Overlap { path: AxisPath },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = DomainError::Parse {
            offset: 12,
            message: "unexpected identifier 'lambda'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parse error at byte 12: unexpected identifier 'lambda'"
        );
    }

    #[test]
    fn display_not_iterable() {
        let err = DomainError::NotIterable {
            axis: AxisPath::from(["a", "b"]),
        };
        assert_eq!(
            err.to_string(),
            "domain is not iterable: axis 'a.b' is a continuous range"
        );
    }

    #[test]
    fn display_overlap() {
        let err = DomainError::Overlap {
            path: AxisPath::from(["c"]),
        };
        assert_eq!(err.to_string(), "domains overlap at 'c'");
    }
}
