//! Cloner configuration
//!
//! Loaded from TOML or built programmatically. Every field has a default, so
//! an empty file is a valid configuration:
//!
//! ```toml
//! clone_text = "[CLONE]"
//! prepend_before_title = true
//! reference_only_content_types = ["author", "category"]
//! max_update_attempts = 3
//! max_in_flight = 16
//! operation_timeout_ms = 30000
//! ```

use crate::error::ConfigError;
use deepclone_model::ContentTypeId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for one cloning operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClonerConfig {
    /// Text added to the display field of every clone
    pub clone_text: String,
    /// Put `clone_text` before the original title (otherwise after)
    pub prepend_before_title: bool,
    /// Content types that are only ever referenced, never cloned
    pub reference_only_content_types: Vec<ContentTypeId>,
    /// Update attempts per record when versions conflict
    pub max_update_attempts: u32,
    /// Store requests in flight per phase
    pub max_in_flight: usize,
    /// Content type schemas kept per operation
    pub schema_cache_capacity: u64,
    /// Abandon the whole operation after this many milliseconds
    pub operation_timeout_ms: Option<u64>,
}

impl ClonerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With clone text and its placement
    #[inline]
    #[must_use]
    pub fn with_clone_text(mut self, text: impl Into<String>, prepend_before_title: bool) -> Self {
        self.clone_text = text.into();
        self.prepend_before_title = prepend_before_title;
        self
    }

    /// With reference-only content types
    #[inline]
    #[must_use]
    pub fn with_reference_only<I, T>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ContentTypeId>,
    {
        self.reference_only_content_types = content_types.into_iter().map(Into::into).collect();
        self
    }

    /// With max update attempts
    #[inline]
    #[must_use]
    pub fn with_max_update_attempts(mut self, attempts: u32) -> Self {
        self.max_update_attempts = attempts;
        self
    }

    /// With max requests in flight
    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// With whole-operation timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Whether records of this content type must never be cloned
    #[inline]
    #[must_use]
    pub fn is_reference_only(&self, content_type_id: &ContentTypeId) -> bool {
        self.reference_only_content_types.contains(content_type_id)
    }

    /// Check invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clone_text.trim().is_empty() {
            return Err(ConfigError::Invalid("clone_text must not be blank".to_string()));
        }
        if self.max_update_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_update_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid("max_in_flight must be at least 1".to_string()));
        }
        if self.schema_cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "schema_cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.operation_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "operation_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClonerConfig {
    fn default() -> Self {
        Self {
            clone_text: "Copy".to_string(),
            prepend_before_title: true,
            reference_only_content_types: Vec::new(),
            max_update_attempts: 3,
            max_in_flight: 16,
            schema_cache_capacity: 256,
            operation_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClonerConfig::default();
        assert_eq!(config.clone_text, "Copy");
        assert!(config.prepend_before_title);
        assert_eq!(config.max_update_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ClonerConfig::from_toml_str("").unwrap(), ClonerConfig::default());
    }

    #[test]
    fn parses_toml() {
        let config = ClonerConfig::from_toml_str(
            r#"
            clone_text = "[CLONE]"
            prepend_before_title = false
            reference_only_content_types = ["author"]
            operation_timeout_ms = 30000
            "#,
        )
        .unwrap();

        assert_eq!(config.clone_text, "[CLONE]");
        assert!(!config.prepend_before_title);
        assert!(config.is_reference_only(&"author".into()));
        assert!(!config.is_reference_only(&"page".into()));
        assert_eq!(config.operation_timeout_ms, Some(30_000));
    }

    #[test]
    fn rejects_blank_clone_text() {
        let err = ClonerConfig::from_toml_str("clone_text = \"   \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_attempts() {
        let config = ClonerConfig::new().with_max_update_attempts(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn keeps_sub_second_timeout() {
        let config = ClonerConfig::new().with_timeout(Duration::from_millis(500));
        assert_eq!(config.operation_timeout_ms, Some(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClonerConfig::from_toml_str("operation_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(ClonerConfig::new().with_timeout(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn rejects_zero_schema_cache_capacity() {
        let err = ClonerConfig::from_toml_str("schema_cache_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = ClonerConfig::from_toml_str("clone_text = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "clone_text = \"(copy)\"").unwrap();

        let config = ClonerConfig::load(file.path()).unwrap();
        assert_eq!(config.clone_text, "(copy)");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ClonerConfig::load("/no/such/deepclone.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
