//! Stream catalog for discovery mode and stream selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    Result,
    error::read_json,
    stream::{PRIMARY_KEYS, REPLICATION_KEY, REPLICATION_METHOD, STREAM_NAME, record_schema},
};

/// A Singer catalog: the streams a tap can emit and whether each is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog entries.
    pub streams: Vec<CatalogEntry>,
}

/// One stream in a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream identifier.
    pub tap_stream_id: String,
    /// Stream name.
    pub stream: String,
    /// JSON schema of each record.
    pub schema: Value,
    /// Primary key columns.
    #[serde(default)]
    pub key_properties: Vec<String>,
    /// Bookmark column, if incremental.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// `INCREMENTAL` or `FULL_TABLE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,
    /// Breadcrumb metadata.
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Metadata attached to a stream (empty breadcrumb) or one of its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path to the node, e.g. `[]` or `["properties", "date"]`.
    pub breadcrumb: Vec<String>,
    /// Metadata values.
    pub metadata: Map<String, Value>,
}

impl Catalog {
    /// Returns the catalog printed by `--discover`.
    #[must_use]
    pub fn discover() -> Self {
        let schema = record_schema();
        let key_properties: Vec<String> = PRIMARY_KEYS.iter().map(ToString::to_string).collect();

        let mut metadata = vec![MetadataEntry {
            breadcrumb: vec![],
            metadata: json_object(json!({
                "inclusion": "available",
                "selected": true,
                "selected-by-default": true,
                "table-key-properties": &key_properties,
                "forced-replication-method": REPLICATION_METHOD,
                "valid-replication-keys": [REPLICATION_KEY],
            })),
        }];

        if let Some(properties) = schema["properties"].as_object() {
            metadata.extend(properties.keys().map(|name| MetadataEntry {
                breadcrumb: vec!["properties".to_string(), name.clone()],
                metadata: json_object(json!({"inclusion": "automatic"})),
            }));
        }

        Self {
            streams: vec![CatalogEntry {
                tap_stream_id: STREAM_NAME.to_string(),
                stream: STREAM_NAME.to_string(),
                schema,
                key_properties,
                replication_key: Some(REPLICATION_KEY.to_string()),
                replication_method: Some(REPLICATION_METHOD.to_string()),
                metadata,
            }],
        }
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Returns the entry for `stream`, if present.
    #[must_use]
    pub fn entry(&self, stream: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|e| e.tap_stream_id == stream)
    }

    /// Returns true if `stream` is in the catalog and selected.
    #[must_use]
    pub fn is_selected(&self, stream: &str) -> bool {
        self.entry(stream).is_some_and(CatalogEntry::is_selected)
    }
}

impl CatalogEntry {
    /// Returns true if the stream-level metadata selects this stream.
    ///
    /// An explicit `selected` wins, then `selected-by-default`; with neither
    /// the stream is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        let Some(root) = self.metadata.iter().find(|m| m.breadcrumb.is_empty()) else {
            return true;
        };

        root.metadata
            .get("selected")
            .or_else(|| root.metadata.get("selected-by-default"))
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
