//! Versioned content records

use crate::fields::Fields;
use crate::ids::{ContentTypeId, RecordId, Version};
use serde::{Deserialize, Serialize};

/// A versioned, identified document held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable identifier, unique within the store
    pub id: RecordId,
    /// Optimistic concurrency version
    pub version: Version,
    /// Schema of this record
    pub content_type_id: ContentTypeId,
    /// Localized field values
    #[serde(default)]
    pub fields: Fields,
    /// Opaque auxiliary data (tags etc.), carried verbatim on clone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Record {
    /// Create record at the initial version
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>, content_type_id: impl Into<ContentTypeId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            version: Version::INITIAL,
            content_type_id: content_type_id.into(),
            fields,
            metadata: None,
        }
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// With version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Distinct entry link targets of this record, in field order
    #[must_use]
    pub fn referenced_ids(&self) -> Vec<RecordId> {
        let mut seen = std::collections::HashSet::new();
        self.fields
            .entry_link_targets()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}
