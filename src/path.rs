//! Axis path value object
//!
//! An `AxisPath` addresses one position in a domain's nesting hierarchy:
//! an ordered, non-empty sequence of segment names. Paths are the keys of
//! the flattened representation and the unit of disjointness for the
//! domain algebra.

use std::fmt;

/// Ordered sequence of segment names addressing an axis in a domain tree.
///
/// Displays as dot-joined segments (`a.b.c`). Ordering and hashing are
/// lexicographic over the segments, which makes paths usable as canonical
/// sort keys for the flattened representation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AxisPath(Vec<String>);

impl AxisPath {
    /// Create a path from anything yielding segment names.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The root path (no segments). Only used transiently while walking a
    /// tree; a flattened entry always carries at least one segment.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Segment names in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// First segment and the remainder, if any.
    pub fn split_first(&self) -> Option<(&str, AxisPath)> {
        let (head, tail) = self.0.split_first()?;
        Some((head.as_str(), AxisPath(tail.to_vec())))
    }

    /// True if `self` is a strict prefix of `other`.
    pub fn is_prefix_of(&self, other: &AxisPath) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for AxisPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for AxisPath {
    fn from(segments: [S; N]) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for AxisPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl From<Vec<String>> for AxisPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}
