//! Deep Clone record store
//!
//! The boundary between the cloner and the content platform:
//! - [`RecordStore`]: async get / create / update / schema lookup
//! - [`StoreError`]: missing records, version conflicts and other failures
//! - [`InMemoryStore`]: concurrent in-memory implementation
//! - [`StoreSnapshot`]: JSON import/export of store contents
//!
//! Enable the `mock` feature for a `mockall`-generated `MockRecordStore`.

#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use error::{StoreError, StoreErrorKind};
pub use memory::InMemoryStore;
pub use snapshot::StoreSnapshot;
#[cfg(feature = "mock")]
pub use store::MockRecordStore;
pub use store::RecordStore;
