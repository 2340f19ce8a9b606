//! Localized record fields
//!
//! Fields map a field name to per-locale values. Both levels keep insertion
//! order so records serialize back the way the store handed them out.

use crate::ids::RecordId;
use crate::link::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Locale code such as `en-US`
pub type Locale = String;

/// Values of one field, keyed by locale
pub type LocalizedValues = IndexMap<Locale, FieldValue>;

/// All fields of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(IndexMap<String, LocalizedValues>);

impl Fields {
    /// Create empty field set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `field` in `locale`
    pub fn set(&mut self, field: impl Into<String>, locale: impl Into<Locale>, value: FieldValue) {
        self.0
            .entry(field.into())
            .or_default()
            .insert(locale.into(), value);
    }

    /// Builder form of [`Fields::set`]
    #[inline]
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, locale: impl Into<Locale>, value: FieldValue) -> Self {
        self.set(field, locale, value);
        self
    }

    /// Values of one field in every locale
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&LocalizedValues> {
        self.0.get(field)
    }

    /// Mutable values of one field
    #[inline]
    pub fn get_mut(&mut self, field: &str) -> Option<&mut LocalizedValues> {
        self.0.get_mut(field)
    }

    /// Value of one field in one locale
    #[inline]
    #[must_use]
    pub fn value(&self, field: &str, locale: &str) -> Option<&FieldValue> {
        self.0.get(field).and_then(|values| values.get(locale))
    }

    /// Whether the field is present
    #[inline]
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalizedValues)> {
        self.0.iter()
    }

    /// Every entry link target across all fields and locales, in field order.
    /// Duplicates are kept.
    pub fn entry_link_targets(&self) -> impl Iterator<Item = &RecordId> {
        self.0
            .values()
            .flat_map(IndexMap::values)
            .flat_map(FieldValue::entry_targets)
    }

    /// Retarget entry links across all fields and locales.
    ///
    /// `redirect` returns the new target for an id, or `None` to leave the
    /// link alone. Returns true if at least one link changed.
    pub fn rewrite_entry_links<F>(&mut self, mut redirect: F) -> bool
    where
        F: FnMut(&RecordId) -> Option<RecordId>,
    {
        let mut changed = false;
        for values in self.0.values_mut() {
            for value in values.values_mut() {
                changed |= value.rewrite_entry_links(&mut redirect);
            }
        }
        changed
    }
}

impl FromIterator<(String, LocalizedValues)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, LocalizedValues)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
