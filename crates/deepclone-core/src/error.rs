//! Error types for the cloner
//!
//! Failures local to one record (a missing reference, a failed clone, a
//! failed update) are absorbed and logged inside the phases. Only failures of
//! the operation as a whole surface as [`CloneError`].

use deepclone_model::RecordId;
use deepclone_store::StoreError;

/// Cloning operation error
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// The root record could not be loaded
    #[error("root record not found: {0}")]
    RootNotFound(RecordId),

    /// The root record was discovered but its clone could not be created
    #[error("root record {0} could not be cloned")]
    RootCloneFailed(RecordId),

    /// Store failure not absorbed by a phase
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The operation exceeded its time budget
    #[error("operation timed out after {duration_ms}ms")]
    Timeout {
        /// Configured budget
        duration_ms: u64,
    },
}

impl CloneError {
    /// Check if running the whole operation again could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Store(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for this schema
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value violates an invariant
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_error_display() {
        let err = CloneError::RootNotFound("main".into());
        assert_eq!(err.to_string(), "root record not found: main");

        let err = CloneError::Timeout { duration_ms: 500 };
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn clone_error_is_retryable() {
        assert!(CloneError::Timeout { duration_ms: 1000 }.is_retryable());
        assert!(CloneError::Store(StoreError::Transport("reset".into())).is_retryable());
        assert!(!CloneError::RootNotFound("a".into()).is_retryable());
        assert!(!CloneError::Config(ConfigError::Invalid("x".into())).is_retryable());
    }

    #[test]
    fn store_errors_convert() {
        let err: CloneError = StoreError::NotFound("a".into()).into();
        assert!(matches!(err, CloneError::Store(StoreError::NotFound(_))));
    }
}
