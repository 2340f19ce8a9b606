//! Link rewiring
//!
//! Points the entry links of every clone at the clones of their targets and
//! persists the clones that changed. Originals and pass-through records are
//! never written.

use crate::clone_set::CloneSet;
use crate::error::CloneError;
use crate::progress::{ProgressCounters, ProgressReporter};
use crate::retry::{with_retry, RetryPolicy};
use deepclone_model::{Fields, Record, RecordId};
use deepclone_store::{RecordStore, StoreError};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;

/// Fields of `record` with entry links retargeted through `redirects`.
///
/// `None` when no link changed.
#[must_use]
pub fn rewired_fields(record: &Record, redirects: &HashMap<RecordId, RecordId>) -> Option<Fields> {
    let mut fields = record.fields.clone();
    fields
        .rewrite_entry_links(|target| redirects.get(target).cloned())
        .then_some(fields)
}

/// Rewire every clone in `set` and return the root's clone.
pub(crate) async fn rewire_and_persist<S>(
    store: &S,
    set: &CloneSet,
    policy: RetryPolicy,
    max_in_flight: usize,
    counters: &ProgressCounters,
    reporter: &dyn ProgressReporter,
) -> Result<Record, CloneError>
where
    S: RecordStore + ?Sized,
{
    let redirects = set.redirects();
    let root_clone_id = set.root_clone().map(|clone| clone.id.clone());

    let mut dirty = Vec::new();
    let mut root_result = set.root_clone().cloned();
    for (_, clone) in set.clones() {
        if let Some(fields) = rewired_fields(clone, &redirects) {
            if Some(&clone.id) == root_clone_id.as_ref() {
                root_result = Some(Record {
                    fields: fields.clone(),
                    ..clone.clone()
                });
            }
            dirty.push((clone, fields));
        }
    }

    tracing::info!(
        clones = set.clone_count(),
        dirty = dirty.len(),
        "rewiring references"
    );

    let persisted: Vec<Record> = stream::iter(dirty)
        .map(|(clone, fields)| async move {
            let result = persist(store, policy, clone, fields).await;
            (clone, result)
        })
        .buffer_unordered(max_in_flight.max(1))
        .filter_map(|(clone, result)| async move {
            match result {
                Ok(stored) => {
                    counters.updated(reporter);
                    tracing::debug!(id = %stored.id, version = %stored.version, "persisted rewired clone");
                    Some(stored)
                }
                Err(err) => {
                    tracing::warn!(id = %clone.id, error = %err, "abandoning update of clone");
                    None
                }
            }
        })
        .collect()
        .await;

    if let Some(root_id) = &root_clone_id {
        if let Some(stored) = persisted.into_iter().find(|record| record.id == *root_id) {
            root_result = Some(stored);
        }
    }

    root_result.ok_or_else(|| CloneError::RootCloneFailed(set.root_id().clone()))
}

/// Update `clone` with `fields`, refetching its version after each conflict.
async fn persist<S>(store: &S, policy: RetryPolicy, clone: &Record, fields: Fields) -> Result<Record, StoreError>
where
    S: RecordStore + ?Sized,
{
    with_retry(policy, StoreError::is_version_conflict, |attempt| {
        let fields = fields.clone();
        async move {
            let version = if attempt == 1 {
                clone.version
            } else {
                store.get(&clone.id).await?.version
            };
            store.update(&clone.id, version, fields).await
        }
    })
    .await
}
