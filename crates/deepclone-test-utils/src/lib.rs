//! Testing utilities for the deep clone workspace
//!
//! Shared fixtures, a fault-injecting store and a recording progress reporter.

#![allow(missing_docs)]

mod scripted;

pub use scripted::{ScriptedStore, StoreCall};

use deepclone_core::ProgressReporter;
use deepclone_model::{ContentTypeSchema, FieldDefinition, FieldValue, Fields, Record, RecordId};
use deepclone_store::InMemoryStore;
use parking_lot::Mutex;
use std::sync::Arc;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Content type used by most fixtures; `title` is its display field
pub const PAGE: &str = "page";

pub fn page_schema() -> ContentTypeSchema {
    schema(PAGE)
}

/// Schema with a `title` display field and the usual link fields
pub fn schema(content_type: &str) -> ContentTypeSchema {
    ContentTypeSchema::new(
        content_type,
        vec![
            FieldDefinition::new("title", "Symbol"),
            FieldDefinition::new("reference", "Link"),
            FieldDefinition::new("references", "Array"),
        ],
    )
    .with_display_field("title")
}

/// Record builder
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: RecordId,
    content_type: String,
    fields: Fields,
}

impl RecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            content_type: PAGE.to_string(),
            fields: Fields::new(),
        }
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.field("title", FieldValue::text(title))
    }

    pub fn link(self, field: &str, target: &str) -> Self {
        self.field(field, FieldValue::entry_link(target))
    }

    pub fn links(self, field: &str, targets: &[&str]) -> Self {
        self.field(field, FieldValue::entry_links(targets.iter().copied()))
    }

    pub fn field(mut self, field: &str, value: FieldValue) -> Self {
        self.fields.set(field, DEFAULT_LOCALE, value);
        self
    }

    pub fn build(self) -> Record {
        Record::new(self.id, self.content_type, self.fields)
    }
}

pub fn record(id: &str) -> RecordBuilder {
    RecordBuilder::new(id)
}

/// In-memory store holding `records` and a `title`-display schema for each of
/// their content types
pub fn store_with(records: impl IntoIterator<Item = Record>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_schema(page_schema());
    for record in records {
        store.insert_schema(schema(record.content_type_id.as_str()));
        store.insert(record);
    }
    store
}

/// `title` in the default locale
pub fn title_of(record: &Record) -> Option<&str> {
    record
        .fields
        .value("title", DEFAULT_LOCALE)
        .and_then(FieldValue::as_text)
}

/// Target of the single entry link in `field`
pub fn link_of<'a>(record: &'a Record, field: &str) -> Option<&'a RecordId> {
    record
        .fields
        .value(field, DEFAULT_LOCALE)
        .and_then(FieldValue::as_entry_link)
}

/// Targets of the entry links in `field`
pub fn links_of<'a>(record: &'a Record, field: &str) -> Vec<&'a RecordId> {
    record
        .fields
        .value(field, DEFAULT_LOCALE)
        .map(|value| value.entry_targets().collect())
        .unwrap_or_default()
}

/// Progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Discovered(usize),
    Cloned(usize),
    Updated(usize),
}

/// Reporter that keeps every event
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn updated_events(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Updated(count) => Some(count),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn on_discovered(&self, count: usize) {
        self.events.lock().push(ProgressEvent::Discovered(count));
    }

    fn on_cloned(&self, count: usize) {
        self.events.lock().push(ProgressEvent::Cloned(count));
    }

    fn on_updated(&self, count: usize) {
        self.events.lock().push(ProgressEvent::Updated(count));
    }
}
