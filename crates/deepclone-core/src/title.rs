//! Field preparation for new clones
//!
//! A clone starts as a deep copy of the original's fields with the display
//! field marked in every locale, e.g. `"[CLONE] Main Entry Title"`.

use crate::config::ClonerConfig;
use deepclone_model::{ContentTypeSchema, FieldValue, Fields, Record};

/// Combine a title with the configured clone text
#[must_use]
pub fn decorate_title(title: &str, clone_text: &str, prepend_before_title: bool) -> String {
    if prepend_before_title {
        format!("{clone_text} {title}")
    } else {
        format!("{title} {clone_text}")
    }
}

/// Fields for the clone of `source`.
///
/// Without a display field on the schema, or when the record lacks that
/// field, the copy is returned unchanged. Non-text values in the display field
/// are left alone.
#[must_use]
pub fn fields_for_clone(source: &Record, schema: &ContentTypeSchema, config: &ClonerConfig) -> Fields {
    let mut fields = source.fields.clone();

    let Some(title_field) = schema.title_field() else {
        return fields;
    };
    let Some(values) = fields.get_mut(&title_field.id) else {
        return fields;
    };

    for value in values.values_mut() {
        let decorated = value
            .as_text()
            .map(|title| decorate_title(title, &config.clone_text, config.prepend_before_title));
        if let Some(decorated) = decorated {
            *value = FieldValue::text(decorated);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepclone_model::FieldDefinition;
    use pretty_assertions::assert_eq;

    fn schema() -> ContentTypeSchema {
        ContentTypeSchema::new(
            "page",
            vec![
                FieldDefinition::new("title", "Text"),
                FieldDefinition::new("reference", "Link"),
            ],
        )
        .with_display_field("title")
    }

    fn record() -> Record {
        Record::new(
            "main",
            "page",
            Fields::new()
                .with("title", "en-US", FieldValue::text("Main Entry Title"))
                .with("title", "de-DE", FieldValue::text("Haupteintrag"))
                .with("reference", "en-US", FieldValue::entry_link("ref")),
        )
    }

    #[test]
    fn prepends_clone_text() {
        let config = ClonerConfig::new().with_clone_text("[CLONE]", true);
        let fields = fields_for_clone(&record(), &schema(), &config);

        assert_eq!(
            fields.value("title", "en-US"),
            Some(&FieldValue::text("[CLONE] Main Entry Title"))
        );
        assert_eq!(
            fields.value("title", "de-DE"),
            Some(&FieldValue::text("[CLONE] Haupteintrag"))
        );
    }

    #[test]
    fn appends_clone_text() {
        let config = ClonerConfig::new().with_clone_text("(copy)", false);
        let fields = fields_for_clone(&record(), &schema(), &config);

        assert_eq!(
            fields.value("title", "en-US").and_then(FieldValue::as_text),
            Some("Main Entry Title (copy)")
        );
    }

    #[test]
    fn leaves_source_untouched() {
        let source = record();
        let _ = fields_for_clone(&source, &schema(), &ClonerConfig::default());
        assert_eq!(
            source.fields.value("title", "en-US").and_then(FieldValue::as_text),
            Some("Main Entry Title")
        );
    }

    #[test]
    fn skips_without_display_field() {
        let schema = ContentTypeSchema::new("page", vec![FieldDefinition::new("title", "Text")]);
        let fields = fields_for_clone(&record(), &schema, &ClonerConfig::default());
        assert_eq!(fields, record().fields);
    }

    #[test]
    fn skips_when_record_lacks_display_field() {
        let source = Record::new(
            "x",
            "page",
            Fields::new().with("reference", "en-US", FieldValue::entry_link("ref")),
        );
        let fields = fields_for_clone(&source, &schema(), &ClonerConfig::default());
        assert_eq!(fields, source.fields);
    }

    #[test]
    fn decorate_title_placement() {
        assert_eq!(decorate_title("T", "Copy", true), "Copy T");
        assert_eq!(decorate_title("T", "Copy", false), "T Copy");
    }
}
