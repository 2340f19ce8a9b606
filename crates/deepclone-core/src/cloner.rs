//! Reference graph cloner
//!
//! Orchestrates one deep clone:
//! - Discovers every record reachable from the root
//! - Clones the root and the selected records
//! - Rewires the clones' links and persists them
//!
//! Each phase completes before the next starts. Failures local to one record
//! are logged and absorbed; the operation fails only when the root cannot be
//! loaded or cloned, or when it runs out of time.

use crate::clone_set::{self, CloneSet};
use crate::config::ClonerConfig;
use crate::discovery::{self, ReferenceClosure};
use crate::error::CloneError;
use crate::progress::{NoProgress, ProgressCounters, ProgressReporter, ProgressSnapshot};
use crate::retry::RetryPolicy;
use crate::rewire;
use crate::tree::ReferenceTree;
use deepclone_model::{Record, RecordId};
use deepclone_store::RecordStore;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Deep cloner over a [`RecordStore`]
///
/// Progress counters live as long as the cloner, so use one cloner per
/// operation when the counts matter.
pub struct ReferenceGraphCloner {
    /// Backing store
    store: Arc<dyn RecordStore>,
    /// Configuration
    config: ClonerConfig,
    /// Progress sink
    reporter: Arc<dyn ProgressReporter>,
    /// Shared counters
    counters: Arc<ProgressCounters>,
}

impl fmt::Debug for ReferenceGraphCloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceGraphCloner")
            .field("config", &self.config)
            .field("progress", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

impl ReferenceGraphCloner {
    /// Create new cloner
    ///
    /// # Errors
    /// - `CloneError::Config` if `config` fails validation
    pub fn new(store: Arc<dyn RecordStore>, config: ClonerConfig) -> Result<Self, CloneError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            reporter: Arc::new(NoProgress),
            counters: Arc::new(ProgressCounters::new()),
        })
    }

    /// With progress reporter
    #[inline]
    #[must_use]
    pub fn with_progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClonerConfig {
        &self.config
    }

    /// Current counter values
    #[inline]
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.counters.snapshot()
    }

    /// Every record reachable from `root` through entry links, root included.
    ///
    /// Records that fail to load are left out; a missing root yields an empty
    /// closure.
    pub async fn discover_references(&self, root: &RecordId) -> ReferenceClosure {
        tracing::info!(root = %root, "discovering references");
        let closure = discovery::discover(
            &*self.store,
            root,
            self.config.max_in_flight,
            &self.counters,
            &*self.reporter,
        )
        .await;
        tracing::info!(root = %root, discovered = closure.len(), "discovery complete");
        closure
    }

    /// Reference tree of `root` for selecting what to clone
    ///
    /// # Errors
    /// - `CloneError::RootNotFound` if the root cannot be loaded
    pub async fn references_tree(&self, root: &RecordId) -> Result<ReferenceTree, CloneError> {
        let closure = self.discover_references(root).await;
        ReferenceTree::build(&closure, root).ok_or_else(|| CloneError::RootNotFound(root.clone()))
    }

    /// Create clones of `root` and every selected record of `closure`.
    ///
    /// # Errors
    /// - `CloneError::RootNotFound` if `root` is not in `closure`
    pub async fn clone_selected(
        &self,
        closure: &ReferenceClosure,
        root: &RecordId,
        selected: &HashSet<RecordId>,
    ) -> Result<CloneSet, CloneError> {
        let set = clone_set::clone_selected(
            &*self.store,
            &self.config,
            closure,
            root,
            selected,
            &self.counters,
            &*self.reporter,
        )
        .await?;
        tracing::info!(root = %root, cloned = set.clone_count(), "cloning complete");
        Ok(set)
    }

    /// Point every clone's links at the clones of their targets and persist
    /// the clones that changed. Returns the root's clone.
    ///
    /// # Errors
    /// - `CloneError::RootCloneFailed` if the root has no clone
    pub async fn rewire_and_persist(&self, set: &CloneSet) -> Result<Record, CloneError> {
        let root = rewire::rewire_and_persist(
            &*self.store,
            set,
            RetryPolicy::new(self.config.max_update_attempts),
            self.config.max_in_flight,
            &self.counters,
            &*self.reporter,
        )
        .await?;
        tracing::info!(
            root = %set.root_id(),
            clone = %root.id,
            updated = self.counters.snapshot().updated,
            "rewiring complete"
        );
        Ok(root)
    }

    /// Deep clone `root`, cloning the selected records of its reference graph.
    ///
    /// Dropping the returned future abandons the operation; clones created so
    /// far stay in the store.
    ///
    /// # Errors
    /// - `CloneError::RootNotFound` if the root cannot be loaded
    /// - `CloneError::RootCloneFailed` if the root's clone cannot be created
    /// - `CloneError::Timeout` if `operation_timeout_ms` elapses
    pub async fn clone_entry(&self, root: &RecordId, selected: &HashSet<RecordId>) -> Result<Record, CloneError> {
        match self.config.operation_timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), self.run(root, selected))
                .await
                .map_err(|_| CloneError::Timeout { duration_ms: ms })?,
            None => self.run(root, selected).await,
        }
    }

    async fn run(&self, root: &RecordId, selected: &HashSet<RecordId>) -> Result<Record, CloneError> {
        let closure = self.discover_references(root).await;
        if !closure.contains(root) {
            tracing::warn!(root = %root, "root record could not be loaded");
            return Err(CloneError::RootNotFound(root.clone()));
        }

        let set = self.clone_selected(&closure, root, selected).await?;
        self.rewire_and_persist(&set).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use deepclone_model::{ContentTypeSchema, FieldDefinition, FieldValue, Fields};
    use deepclone_store::InMemoryStore;

    fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.insert_schema(
            ContentTypeSchema::new("page", vec![FieldDefinition::new("title", "Symbol")])
                .with_display_field("title"),
        );
        store.insert(Record::new(
            "a",
            "page",
            Fields::new()
                .with("title", "en-US", FieldValue::text("A"))
                .with("next", "en-US", FieldValue::entry_link("b")),
        ));
        store.insert(Record::new(
            "b",
            "page",
            Fields::new().with("title", "en-US", FieldValue::text("B")),
        ));
        store
    }

    #[test]
    fn rejects_invalid_config() {
        let err = ReferenceGraphCloner::new(store(), ClonerConfig::new().with_clone_text(" ", true)).unwrap_err();
        assert!(matches!(err, CloneError::Config(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn clones_selected_graph() {
        let store = store();
        let cloner = ReferenceGraphCloner::new(store.clone(), ClonerConfig::default()).unwrap();

        let selected = HashSet::from([RecordId::from("b")]);
        let root = cloner.clone_entry(&"a".into(), &selected).await.unwrap();

        assert_ne!(root.id.as_str(), "a");
        assert_eq!(root.fields.value("title", "en-US"), Some(&FieldValue::text("Copy A")));
        let target = root.fields.value("next", "en-US").and_then(FieldValue::as_entry_link).unwrap();
        assert_ne!(target.as_str(), "b");
        assert_eq!(
            store.peek(target).unwrap().fields.value("title", "en-US"),
            Some(&FieldValue::text("Copy B"))
        );
        assert_eq!(
            cloner.progress(),
            ProgressSnapshot {
                discovered: 2,
                cloned: 2,
                updated: 1
            }
        );
    }

    #[tokio::test]
    async fn missing_root_fails_fast() {
        let store = store();
        let cloner = ReferenceGraphCloner::new(store.clone(), ClonerConfig::default()).unwrap();

        let err = cloner.clone_entry(&"ghost".into(), &HashSet::new()).await.unwrap_err();
        assert!(matches!(err, CloneError::RootNotFound(_)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn references_tree_of_missing_root_is_an_error() {
        let cloner = ReferenceGraphCloner::new(store(), ClonerConfig::default()).unwrap();
        assert!(cloner.references_tree(&"a".into()).await.is_ok());
        assert!(matches!(
            cloner.references_tree(&"ghost".into()).await,
            Err(CloneError::RootNotFound(_))
        ));
    }
}
