//! Content type schemas
//!
//! Only the parts the cloner needs: the display field and the field list.

use crate::ids::ContentTypeId;
use serde::{Deserialize, Serialize};

/// Field definition within a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field identifier
    pub id: String,
    /// Platform field type (`Symbol`, `Text`, `Link`, `Array`, ...)
    #[serde(rename = "type", default)]
    pub field_type: String,
}

impl FieldDefinition {
    /// Create new field definition
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type: field_type.into(),
        }
    }
}

/// Schema of a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSchema {
    /// Content type identifier
    pub id: ContentTypeId,
    /// Field used as the record title, if any
    #[serde(default)]
    pub display_field: Option<String>,
    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ContentTypeSchema {
    /// Create schema without a display field
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ContentTypeId>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: id.into(),
            display_field: None,
            fields,
        }
    }

    /// With display field
    #[inline]
    #[must_use]
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = Some(field.into());
        self
    }

    /// The display field, only when it names a declared field
    #[must_use]
    pub fn title_field(&self) -> Option<&FieldDefinition> {
        let display = self.display_field.as_deref()?;
        self.fields.iter().find(|field| field.id == display)
    }
}
