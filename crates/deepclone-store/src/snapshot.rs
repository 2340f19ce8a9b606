//! JSON snapshots of store contents
//!
//! ```json
//! { "contentTypes": [ ... ], "records": [ ... ] }
//! ```

use crate::error::StoreError;
use deepclone_model::{ContentTypeSchema, Record};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable contents of a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Content type schemas
    #[serde(default)]
    pub content_types: Vec<ContentTypeSchema>,
    /// Records
    #[serde(default)]
    pub records: Vec<Record>,
}

impl StoreSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Read a snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Snapshot(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Write this snapshot as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Snapshot(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| StoreError::Snapshot(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepclone_model::RecordId;

    const SNAPSHOT: &str = r#"{
        "contentTypes": [
            { "id": "page", "displayField": "title", "fields": [{ "id": "title", "type": "Symbol" }] }
        ],
        "records": [
            {
                "id": "a",
                "version": 4,
                "contentTypeId": "page",
                "fields": {
                    "title": { "en-US": "Home" },
                    "next": { "en-US": { "sys": { "type": "Link", "linkType": "Entry", "id": "b" } } }
                }
            }
        ]
    }"#;

    #[test]
    fn parses_snapshot() {
        let snapshot = StoreSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.content_types.len(), 1);
        assert_eq!(snapshot.records[0].referenced_ids(), vec![RecordId::from("b")]);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = StoreSnapshot::from_json("{ nope").unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let snapshot = StoreSnapshot::from_json(SNAPSHOT).unwrap();

        snapshot.save(&path).unwrap();
        assert_eq!(StoreSnapshot::load(&path).unwrap(), snapshot);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = StoreSnapshot::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("here.json"));
    }
}
