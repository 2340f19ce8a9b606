//! Node paths within a reference tree
//!
//! The same record can appear in several branches, so tree nodes are
//! addressed by the ids from the root down to the node, joined with `:`
//! (`root:hero:banner`).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between path segments
pub const PATH_SEPARATOR: char = ':';

/// Path from the tree root to a node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path of a tree root
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the parent node
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self(rest.to_vec())),
            _ => None,
        }
    }

    /// Id of the addressed node
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Whether the path passes through `segment`
    #[inline]
    #[must_use]
    pub fn contains(&self, segment: &str) -> bool {
        self.0.iter().any(|s| s == segment)
    }

    /// Check if this path is a prefix of another
    ///
    /// `a:b` is a prefix of `a:b:c` but not of `a:x`.
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Iterator over segments from root to node
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for TreePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        s.split(PATH_SEPARATOR)
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

/// Errors related to tree paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty path
    #[error("path is empty")]
    Empty,

    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
}
