//! Store wrapper with call recording and fault injection

use async_trait::async_trait;
use deepclone_model::{ContentTypeId, ContentTypeSchema, Fields, Record, RecordId, Version};
use deepclone_store::{InMemoryStore, RecordStore, StoreError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One call made against a [`ScriptedStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(RecordId),
    Create(ContentTypeId),
    Update { id: RecordId, version: Version },
    Schema(ContentTypeId),
}

type FieldsPredicate = Box<dyn Fn(&ContentTypeId, &Fields) -> bool + Send + Sync>;
type UpdatePredicate = Box<dyn Fn(&RecordId, &Fields) -> bool + Send + Sync>;

struct ConflictRule {
    matches: UpdatePredicate,
    remaining: AtomicUsize,
}

/// [`InMemoryStore`] wrapper that records every call and injects failures
///
/// Injected version conflicts are real: the stored version is bumped as if
/// another writer got there first, then the update is passed through.
pub struct ScriptedStore {
    inner: Arc<InMemoryStore>,
    calls: Mutex<Vec<StoreCall>>,
    get_failures: Vec<(RecordId, StoreError)>,
    create_failures: Vec<(FieldsPredicate, StoreError)>,
    update_failures: Vec<(UpdatePredicate, StoreError)>,
    schema_failures: Vec<(ContentTypeId, StoreError)>,
    conflicts: Vec<ConflictRule>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            get_failures: Vec::new(),
            create_failures: Vec::new(),
            update_failures: Vec::new(),
            schema_failures: Vec::new(),
            conflicts: Vec::new(),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail every `get` of `id`
    #[must_use]
    pub fn fail_gets_of(mut self, id: impl Into<RecordId>, err: StoreError) -> Self {
        self.get_failures.push((id.into(), err));
        self
    }

    /// Fail every `create` whose content type and fields match
    #[must_use]
    pub fn fail_creates_where<F>(mut self, matches: F, err: StoreError) -> Self
    where
        F: Fn(&ContentTypeId, &Fields) -> bool + Send + Sync + 'static,
    {
        self.create_failures.push((Box::new(matches), err));
        self
    }

    /// Fail every `update` whose id and fields match
    #[must_use]
    pub fn fail_updates_where<F>(mut self, matches: F, err: StoreError) -> Self
    where
        F: Fn(&RecordId, &Fields) -> bool + Send + Sync + 'static,
    {
        self.update_failures.push((Box::new(matches), err));
        self
    }

    /// Fail every schema fetch for `content_type`
    #[must_use]
    pub fn fail_schema_of(mut self, content_type: impl Into<ContentTypeId>, err: StoreError) -> Self {
        self.schema_failures.push((content_type.into(), err));
        self
    }

    /// Make the next `times` matching updates hit a version conflict
    #[must_use]
    pub fn conflict_updates_where<F>(mut self, matches: F, times: usize) -> Self
    where
        F: Fn(&RecordId, &Fields) -> bool + Send + Sync + 'static,
    {
        self.conflicts.push(ConflictRule {
            matches: Box::new(matches),
            remaining: AtomicUsize::new(times),
        });
        self
    }

    /// Sleep this long inside every call
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Wrapped store
    pub fn inner(&self) -> &Arc<InMemoryStore> {
        &self.inner
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    /// Number of `get` calls for `id`
    pub fn gets_of(&self, id: &str) -> usize {
        self.count(|call| matches!(call, StoreCall::Get(got) if got.as_str() == id))
    }

    /// Number of `update` calls
    pub fn updates(&self) -> usize {
        self.count(|call| matches!(call, StoreCall::Update { .. }))
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: StoreCall) -> InFlight<'_> {
        self.calls.lock().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        InFlight(&self.in_flight)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn get(&self, id: &RecordId) -> Result<Record, StoreError> {
        let _guard = self.enter(StoreCall::Get(id.clone())).await;
        if let Some((_, err)) = self.get_failures.iter().find(|(failing, _)| failing == id) {
            return Err(err.clone());
        }
        self.inner.get(id).await
    }

    async fn create(
        &self,
        content_type_id: &ContentTypeId,
        fields: Fields,
        metadata: Option<serde_json::Value>,
    ) -> Result<Record, StoreError> {
        let _guard = self.enter(StoreCall::Create(content_type_id.clone())).await;
        if let Some((_, err)) = self
            .create_failures
            .iter()
            .find(|(matches, _)| matches(content_type_id, &fields))
        {
            return Err(err.clone());
        }
        self.inner.create(content_type_id, fields, metadata).await
    }

    async fn update(
        &self,
        id: &RecordId,
        expected_version: Version,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        let _guard = self
            .enter(StoreCall::Update {
                id: id.clone(),
                version: expected_version,
            })
            .await;
        if let Some((_, err)) = self.update_failures.iter().find(|(matches, _)| matches(id, &fields)) {
            return Err(err.clone());
        }
        for rule in &self.conflicts {
            let hit = (rule.matches)(id, &fields)
                && rule
                    .remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
            if hit {
                self.inner.touch(id);
            }
        }
        self.inner.update(id, expected_version, fields).await
    }

    async fn get_content_type_schema(
        &self,
        content_type_id: &ContentTypeId,
    ) -> Result<ContentTypeSchema, StoreError> {
        let _guard = self.enter(StoreCall::Schema(content_type_id.clone())).await;
        if let Some((_, err)) = self.schema_failures.iter().find(|(failing, _)| failing == content_type_id) {
            return Err(err.clone());
        }
        self.inner.get_content_type_schema(content_type_id).await
    }
}
