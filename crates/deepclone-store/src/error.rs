//! Error types for the record store boundary
//!
//! Distinguishes the failure kinds the cloner reacts to differently:
//! - Missing records (expected, absorbed by discovery)
//! - Version conflicts (retried after a refetch)
//! - Everything else (logged, not retried)

use deepclone_model::{ContentTypeId, RecordId, Version};

/// Record store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Record does not exist or was deleted
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Content type does not exist
    #[error("content type not found: {0}")]
    ContentTypeNotFound(ContentTypeId),

    /// Expected version did not match the stored version
    #[error("version conflict on {id}: expected {expected}, stored {actual}")]
    VersionConflict {
        /// Record being updated
        id: RecordId,
        /// Version the caller sent
        expected: Version,
        /// Version the store holds
        actual: Version,
    },

    /// Caller may not perform the operation
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Payload rejected by the store
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network or backend failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Snapshot could not be read or written
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Coarse classification of [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Record or content type missing
    NotFound,
    /// Optimistic concurrency conflict
    VersionConflict,
    /// Authorization failure
    Unauthorized,
    /// Validation failure
    Validation,
    /// Transport or snapshot failure
    Transport,
}

impl StoreError {
    /// Classify this error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound(_) | Self::ContentTypeNotFound(_) => StoreErrorKind::NotFound,
            Self::VersionConflict { .. } => StoreErrorKind::VersionConflict,
            Self::Unauthorized(_) => StoreErrorKind::Unauthorized,
            Self::Validation(_) => StoreErrorKind::Validation,
            Self::Transport(_) | Self::Snapshot(_) => StoreErrorKind::Transport,
        }
    }

    /// Check if the record is missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an optimistic concurrency conflict
    #[inline]
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Check if a retry could succeed without changing the request
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::VersionConflict {
            id: "a".into(),
            expected: Version(1),
            actual: Version(2),
        };
        assert_eq!(err.to_string(), "version conflict on a: expected v1, stored v2");
    }

    #[test]
    fn store_error_classification() {
        assert!(StoreError::NotFound("a".into()).is_not_found());
        assert!(!StoreError::ContentTypeNotFound("page".into()).is_not_found());
        assert_eq!(
            StoreError::ContentTypeNotFound("page".into()).kind(),
            StoreErrorKind::NotFound
        );
        assert_eq!(
            StoreError::Snapshot("bad".into()).kind(),
            StoreErrorKind::Transport
        );
    }

    #[test]
    fn store_error_is_retryable() {
        let conflict = StoreError::VersionConflict {
            id: "a".into(),
            expected: Version(1),
            actual: Version(2),
        };
        assert!(conflict.is_retryable());
        assert!(conflict.is_version_conflict());
        assert!(StoreError::Transport("reset".into()).is_retryable());
        assert!(!StoreError::Validation("bad".into()).is_retryable());
        assert!(!StoreError::Unauthorized("no".into()).is_version_conflict());
    }
}
