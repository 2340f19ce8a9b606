//! Deep Clone data model
//!
//! Versioned content records and the typed links between them.
//!
//! # Core Concepts
//!
//! - [`Record`]: identified, versioned document with localized [`Fields`]
//! - [`FieldValue`]: tagged scalar / [`Link`] / link-array value
//! - [`LinkType`]: only [`LinkType::Entry`] links form the reference graph
//! - [`ContentTypeSchema`]: display field and field list of a content type
//!
//! # Example
//!
//! ```rust
//! use deepclone_model::{FieldValue, Fields, Record};
//!
//! let record = Record::new(
//!     "page-1",
//!     "page",
//!     Fields::new()
//!         .with("title", "en-US", FieldValue::text("Home"))
//!         .with("hero", "en-US", FieldValue::entry_link("banner-1")),
//! );
//! assert_eq!(record.referenced_ids().len(), 1);
//! ```

#![warn(unreachable_pub)]

mod fields;
mod ids;
mod link;
mod record;
mod schema;

pub use fields::{Fields, Locale, LocalizedValues};
pub use ids::{ContentTypeId, RecordId, Version};
pub use link::{FieldValue, Link, LinkType};
pub use record::Record;
pub use schema::{ContentTypeSchema, FieldDefinition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
