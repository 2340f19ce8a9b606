//! Reference discovery
//!
//! Breadth-first traversal of the entry-link graph starting at a root record.
//! Many `get` requests are kept in flight at once; an id is claimed before its
//! fetch is issued, so no record is ever requested twice and cycles end the
//! traversal naturally. Records that cannot be loaded are left out.

use crate::progress::{ProgressCounters, ProgressReporter};
use deepclone_model::{Record, RecordId};
use deepclone_store::RecordStore;
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

/// Every record reachable from a root, keyed by id
///
/// Ordered by discovery, so the root comes first when it could be loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceClosure {
    records: IndexMap<RecordId, Record>,
}

impl ReferenceClosure {
    /// Create empty closure
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; returns false if its id was already present
    pub fn insert(&mut self, record: Record) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    /// Look up a record
    #[inline]
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    /// Whether the id was discovered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was discovered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids in discovery order
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.keys()
    }

    /// Records in discovery order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

impl FromIterator<Record> for ReferenceClosure {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut closure = Self::new();
        for record in iter {
            closure.insert(record);
        }
        closure
    }
}

/// Discover the reference closure of `root`.
///
/// At most `max_in_flight` fetches run concurrently.
pub(crate) async fn discover<S>(
    store: &S,
    root: &RecordId,
    max_in_flight: usize,
    counters: &ProgressCounters,
    reporter: &dyn ProgressReporter,
) -> ReferenceClosure
where
    S: RecordStore + ?Sized,
{
    let max_in_flight = max_in_flight.max(1);
    let mut closure = ReferenceClosure::new();
    let mut claimed: HashSet<RecordId> = HashSet::from([root.clone()]);
    let mut queue: VecDeque<RecordId> = VecDeque::from([root.clone()]);
    let mut in_flight = FuturesUnordered::new();

    loop {
        while in_flight.len() < max_in_flight {
            let Some(id) = queue.pop_front() else { break };
            in_flight.push(async move {
                let result = store.get(&id).await;
                (id, result)
            });
        }

        let Some((id, result)) = in_flight.next().await else {
            break;
        };

        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_not_found() => {
                tracing::debug!(id = %id, "skipping missing reference");
                continue;
            }
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "skipping reference that failed to load");
                continue;
            }
        };

        for target in record.fields.entry_link_targets() {
            if claimed.insert(target.clone()) {
                queue.push_back(target.clone());
            }
        }

        tracing::trace!(id = %id, "discovered record");
        if closure.insert(record) {
            counters.discovered(reporter);
        }
    }

    closure
}
