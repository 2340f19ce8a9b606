//! Selective cloning
//!
//! Every selected record of the closure (and always the root) gets a fresh
//! copy in the store; the rest of the closure is carried along untouched so
//! the rewiring pass can see the whole graph.

use crate::config::ClonerConfig;
use crate::discovery::ReferenceClosure;
use crate::error::CloneError;
use crate::progress::{ProgressCounters, ProgressReporter};
use crate::schema_cache::SchemaCache;
use crate::title::fields_for_clone;
use deepclone_model::{Record, RecordId};
use deepclone_store::{RecordStore, StoreError};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// What happened to one record of the closure
#[derive(Debug, Clone, PartialEq)]
pub enum CloneEntry {
    /// A copy was created in the store
    Cloned {
        /// Record the copy was made from
        original: Record,
        /// Copy as returned by the store
        clone: Record,
    },
    /// Not selected; kept as is
    PassThrough(Record),
}

impl CloneEntry {
    /// Record the cloner will rewire: the clone, or the untouched original
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Record {
        match self {
            Self::Cloned { clone, .. } => clone,
            Self::PassThrough(record) => record,
        }
    }

    /// Id links to this entry should point at after rewiring
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &RecordId {
        &self.record().id
    }

    /// Whether a copy was created
    #[inline]
    #[must_use]
    pub fn is_cloned(&self) -> bool {
        matches!(self, Self::Cloned { .. })
    }
}

/// Result of the cloning phase, keyed by original id in closure order
#[derive(Debug, Clone)]
pub struct CloneSet {
    root: RecordId,
    entries: IndexMap<RecordId, CloneEntry>,
}

impl CloneSet {
    /// Create from entries
    #[must_use]
    pub fn new(root: RecordId, entries: IndexMap<RecordId, CloneEntry>) -> Self {
        Self { root, entries }
    }

    /// Original id of the root
    #[inline]
    #[must_use]
    pub fn root_id(&self) -> &RecordId {
        &self.root
    }

    /// The root's clone, if it could be created
    #[must_use]
    pub fn root_clone(&self) -> Option<&Record> {
        match self.entries.get(&self.root)? {
            CloneEntry::Cloned { clone, .. } => Some(clone),
            CloneEntry::PassThrough(_) => None,
        }
    }

    /// Entry for an original id
    #[inline]
    #[must_use]
    pub fn get(&self, original: &RecordId) -> Option<&CloneEntry> {
        self.entries.get(original)
    }

    /// Whether the original id was cloned
    #[inline]
    #[must_use]
    pub fn is_cloned(&self, original: &RecordId) -> bool {
        self.entries.get(original).is_some_and(CloneEntry::is_cloned)
    }

    /// All entries in closure order
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &CloneEntry)> {
        self.entries.iter()
    }

    /// `(original, clone)` pairs
    pub fn clones(&self) -> impl Iterator<Item = (&Record, &Record)> {
        self.entries.values().filter_map(|entry| match entry {
            CloneEntry::Cloned { original, clone } => Some((original, clone)),
            CloneEntry::PassThrough(_) => None,
        })
    }

    /// Records kept as is
    pub fn pass_throughs(&self) -> impl Iterator<Item = &Record> {
        self.entries.values().filter_map(|entry| match entry {
            CloneEntry::PassThrough(record) => Some(record),
            CloneEntry::Cloned { .. } => None,
        })
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of clones created
    #[must_use]
    pub fn clone_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_cloned()).count()
    }

    /// Map from original id to clone id, for clones whose id differs
    #[must_use]
    pub fn redirects(&self) -> HashMap<RecordId, RecordId> {
        self.clones()
            .filter(|(original, clone)| original.id != clone.id)
            .map(|(original, clone)| (original.id.clone(), clone.id.clone()))
            .collect()
    }
}

/// Clone the selected records of `closure` and the root.
pub(crate) async fn clone_selected<S>(
    store: &S,
    config: &ClonerConfig,
    closure: &ReferenceClosure,
    root: &RecordId,
    selected: &HashSet<RecordId>,
    counters: &ProgressCounters,
    reporter: &dyn ProgressReporter,
) -> Result<CloneSet, CloneError>
where
    S: RecordStore + ?Sized,
{
    if !closure.contains(root) {
        return Err(CloneError::RootNotFound(root.clone()));
    }

    let wants_clone = |record: &Record| {
        record.id == *root
            || (selected.contains(&record.id) && !config.is_reference_only(&record.content_type_id))
    };

    for record in closure.records() {
        if record.id != *root && selected.contains(&record.id) && !wants_clone(record) {
            tracing::info!(
                id = %record.id,
                content_type = %record.content_type_id,
                "not cloning reference-only content type"
            );
        }
    }

    let to_clone: Vec<&Record> = closure.records().filter(|record| wants_clone(record)).collect();

    tracing::info!(
        root = %root,
        clones = to_clone.len(),
        closure = closure.len(),
        "cloning selected records"
    );

    let schemas = SchemaCache::new(config.schema_cache_capacity);
    let mut clones: HashMap<RecordId, Record> = stream::iter(to_clone)
        .map(|original| {
            let schemas = &schemas;
            async move {
                let result = create_clone(store, schemas, config, original).await;
                (original, result)
            }
        })
        .buffer_unordered(config.max_in_flight.max(1))
        .filter_map(|(original, result)| async move {
            match result {
                Ok(clone) => {
                    counters.cloned(reporter);
                    tracing::debug!(original = %original.id, clone = %clone.id, "created clone");
                    Some((original.id.clone(), clone))
                }
                Err(err) => {
                    tracing::warn!(id = %original.id, error = %err, "failed to clone record");
                    None
                }
            }
        })
        .collect()
        .await;

    let mut entries = IndexMap::with_capacity(closure.len());
    for record in closure.records() {
        if let Some(clone) = clones.remove(&record.id) {
            entries.insert(
                record.id.clone(),
                CloneEntry::Cloned {
                    original: record.clone(),
                    clone,
                },
            );
        } else if !wants_clone(record) {
            // failed clones are left out; links to them stay as they are
            entries.insert(record.id.clone(), CloneEntry::PassThrough(record.clone()));
        }
    }

    Ok(CloneSet::new(root.clone(), entries))
}

async fn create_clone<S>(
    store: &S,
    schemas: &SchemaCache,
    config: &ClonerConfig,
    original: &Record,
) -> Result<Record, StoreError>
where
    S: RecordStore + ?Sized,
{
    let schema = schemas.get_or_fetch(store, &original.content_type_id).await?;
    let fields = fields_for_clone(original, &schema, config);
    store
        .create(&original.content_type_id, fields, original.metadata.clone())
        .await
}
