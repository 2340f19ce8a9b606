//! Content type schema cache using moka
//!
//! Scoped to one cloning operation. Each content type is fetched from the
//! store at most once; concurrent lookups for the same content type wait on a
//! single in-flight request instead of issuing their own.

use deepclone_model::{ContentTypeId, ContentTypeSchema};
use deepclone_store::{RecordStore, StoreError};
use moka::future::Cache;
use std::sync::Arc;

/// Per-operation schema cache
#[derive(Debug, Clone)]
pub struct SchemaCache {
    inner: Cache<ContentTypeId, Arc<ContentTypeSchema>>,
}

impl SchemaCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Get the schema, fetching it from `store` on first use.
    ///
    /// Failed fetches are not cached; the next lookup tries again.
    pub async fn get_or_fetch<S>(
        &self,
        store: &S,
        content_type_id: &ContentTypeId,
    ) -> Result<Arc<ContentTypeSchema>, StoreError>
    where
        S: RecordStore + ?Sized,
    {
        self.inner
            .try_get_with(content_type_id.clone(), async {
                tracing::debug!(content_type = %content_type_id, "fetching content type schema");
                store
                    .get_content_type_schema(content_type_id)
                    .await
                    .map(Arc::new)
            })
            .await
            .map_err(|err: Arc<StoreError>| (*err).clone())
    }

    /// Get a cached schema without fetching
    #[inline]
    pub async fn get(&self, content_type_id: &ContentTypeId) -> Option<Arc<ContentTypeSchema>> {
        self.inner.get(content_type_id).await
    }
}

impl Default for SchemaCache {
    /// Create cache with default capacity (256 content types)
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepclone_model::FieldDefinition;
    use deepclone_store::InMemoryStore;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_schema(
            ContentTypeSchema::new("page", vec![FieldDefinition::new("title", "Symbol")])
                .with_display_field("title"),
        );
        store
    }

    #[tokio::test]
    async fn fetches_and_caches() {
        let cache = SchemaCache::new(10);
        let store = store();

        assert!(cache.get(&"page".into()).await.is_none());
        let schema = cache.get_or_fetch(&store, &"page".into()).await.unwrap();
        assert_eq!(schema.display_field.as_deref(), Some("title"));
        assert!(cache.get(&"page".into()).await.is_some());
    }

    #[tokio::test]
    async fn missing_content_type_is_an_error() {
        let cache = SchemaCache::default();
        let err = cache.get_or_fetch(&store(), &"nope".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::ContentTypeNotFound(_)));
        assert!(cache.get(&"nope".into()).await.is_none());
    }
}
