//! Deep Clone Core - reference graph cloner
//!
//! Clones a record together with the records it references:
//! - Discovers the reference closure of a root record
//! - Clones the root and a selected subset of the closure
//! - Rewires the clones' links to point at each other
//! - Persists changed clones with optimistic-concurrency retries
//!
//! # Example
//!
//! ```rust,ignore
//! use deepclone_core::{ClonerConfig, ReferenceGraphCloner};
//! use deepclone_store::InMemoryStore;
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let cloner = ReferenceGraphCloner::new(store, ClonerConfig::default())?;
//!
//! let root = cloner.clone_entry(&"page-1".into(), &HashSet::new()).await?;
//! println!("cloned into {}", root.id);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod clone_set;
pub mod cloner;
pub mod config;
pub mod discovery;
pub mod error;
pub mod progress;
pub mod retry;
pub mod rewire;
pub mod schema_cache;
pub mod title;
pub mod tree;

pub use clone_set::{CloneEntry, CloneSet};
pub use cloner::ReferenceGraphCloner;
pub use config::ClonerConfig;
pub use discovery::ReferenceClosure;
pub use error::{CloneError, ConfigError};
pub use progress::{NoProgress, ProgressCounters, ProgressReporter, ProgressSnapshot, TracingProgress};
pub use retry::{with_retry, RetryPolicy};
pub use rewire::rewired_fields;
pub use schema_cache::SchemaCache;
pub use title::{decorate_title, fields_for_clone};
pub use tree::{NodeKind, ReferenceTree, TreeNode, TreePath, MAX_TREE_DEPTH};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a deep clone
    pub use crate::{
        CloneError, ClonerConfig, ProgressReporter, ProgressSnapshot, ReferenceGraphCloner,
        ReferenceTree, TracingProgress,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
