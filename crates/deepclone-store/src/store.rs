//! The record store boundary
//!
//! The cloner talks to the content platform only through [`RecordStore`].
//! Every method is a suspension point; implementations are expected to be
//! safe to call from many in-flight futures at once.

use crate::error::StoreError;
use async_trait::async_trait;
use deepclone_model::{ContentTypeId, ContentTypeSchema, Fields, Record, RecordId, Version};
use std::sync::Arc;

/// Versioned record storage with optimistic concurrency
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the record does not exist or was deleted
    async fn get(&self, id: &RecordId) -> Result<Record, StoreError>;

    /// Create a record with a fresh id at the store's initial version
    async fn create(
        &self,
        content_type_id: &ContentTypeId,
        fields: Fields,
        metadata: Option<serde_json::Value>,
    ) -> Result<Record, StoreError>;

    /// Replace a record's fields if its stored version equals `expected_version`
    ///
    /// # Errors
    /// - `StoreError::VersionConflict` if the stored version differs
    async fn update(
        &self,
        id: &RecordId,
        expected_version: Version,
        fields: Fields,
    ) -> Result<Record, StoreError>;

    /// Fetch the schema of a content type
    async fn get_content_type_schema(
        &self,
        content_type_id: &ContentTypeId,
    ) -> Result<ContentTypeSchema, StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn get(&self, id: &RecordId) -> Result<Record, StoreError> {
        (**self).get(id).await
    }

    async fn create(
        &self,
        content_type_id: &ContentTypeId,
        fields: Fields,
        metadata: Option<serde_json::Value>,
    ) -> Result<Record, StoreError> {
        (**self).create(content_type_id, fields, metadata).await
    }

    async fn update(
        &self,
        id: &RecordId,
        expected_version: Version,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        (**self).update(id, expected_version, fields).await
    }

    async fn get_content_type_schema(
        &self,
        content_type_id: &ContentTypeId,
    ) -> Result<ContentTypeSchema, StoreError> {
        (**self).get_content_type_schema(content_type_id).await
    }
}
