//! In-memory record store
//!
//! A [`RecordStore`] backed by concurrent maps. Enforces the same optimistic
//! concurrency contract as the platform: every successful update bumps the
//! version, and an update sent with a stale version is rejected.

use crate::error::StoreError;
use crate::snapshot::StoreSnapshot;
use crate::store::RecordStore;
use async_trait::async_trait;
use dashmap::DashMap;
use deepclone_model::{ContentTypeId, ContentTypeSchema, Fields, Record, RecordId, Version};
use ulid::Ulid;

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<RecordId, Record>,
    schemas: DashMap<ContentTypeId, ContentTypeSchema>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the contents of `snapshot`
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for schema in snapshot.content_types {
            store.insert_schema(schema);
        }
        for record in snapshot.records {
            store.insert(record);
        }
        store
    }

    /// Capture the current contents, records ordered by id
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut content_types: Vec<_> = self.schemas.iter().map(|e| e.value().clone()).collect();
        content_types.sort_by(|a, b| a.id.cmp(&b.id));
        StoreSnapshot {
            content_types,
            records: self.records(),
        }
    }

    /// Insert or replace a record as-is
    pub fn insert(&self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    /// Insert or replace a content type schema
    pub fn insert_schema(&self, schema: ContentTypeSchema) {
        self.schemas.insert(schema.id.clone(), schema);
    }

    /// Delete a record, returning it if it existed
    pub fn remove(&self, id: &RecordId) -> Option<Record> {
        self.records.remove(id).map(|(_, record)| record)
    }

    /// Bump a record's version without changing its fields, as a concurrent
    /// writer would. Returns the new version.
    pub fn touch(&self, id: &RecordId) -> Option<Version> {
        self.records.get_mut(id).map(|mut record| {
            record.version = record.version.next();
            record.version
        })
    }

    /// Current copy of a record, if present
    #[must_use]
    pub fn peek(&self, id: &RecordId) -> Option<Record> {
        self.records.get(id).map(|record| record.value().clone())
    }

    /// All records ordered by id
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let mut records: Vec<_> = self.records.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.peek(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create(
        &self,
        content_type_id: &ContentTypeId,
        fields: Fields,
        metadata: Option<serde_json::Value>,
    ) -> Result<Record, StoreError> {
        if !self.schemas.contains_key(content_type_id) {
            return Err(StoreError::Validation(format!(
                "unknown content type {content_type_id}"
            )));
        }

        let record = Record {
            id: RecordId::new(Ulid::new().to_string()),
            version: Version::INITIAL,
            content_type_id: content_type_id.clone(),
            fields,
            metadata,
        };
        self.insert(record.clone());
        tracing::trace!(id = %record.id, content_type = %content_type_id, "created record");
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        expected_version: Version,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.clone(),
                expected: expected_version,
                actual: record.version,
            });
        }

        record.fields = fields;
        record.version = record.version.next();
        tracing::trace!(id = %id, version = %record.version, "updated record");
        Ok(record.clone())
    }

    async fn get_content_type_schema(
        &self,
        content_type_id: &ContentTypeId,
    ) -> Result<ContentTypeSchema, StoreError> {
        self.schemas
            .get(content_type_id)
            .map(|schema| schema.value().clone())
            .ok_or_else(|| StoreError::ContentTypeNotFound(content_type_id.clone()))
    }
}
