//! Definition of the `historical` stream.

use serde_json::{Value, json};

use crate::Message;

/// Name of the only stream this tap emits.
pub const STREAM_NAME: &str = "historical";

/// Record field used as the incremental bookmark.
pub const REPLICATION_KEY: &str = "date";

/// Replication method advertised in the catalog.
pub const REPLICATION_METHOD: &str = "INCREMENTAL";

/// Fields that identify a record.
pub const PRIMARY_KEYS: [&str; 3] = ["date", "base", "symbol"];

/// Returns the JSON schema of a `historical` record.
#[must_use]
pub fn record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "date": {"type": ["string", "null"], "format": "date"},
            "base": {"type": ["string", "null"]},
            "symbol": {"type": ["string", "null"]},
            "rate": {"type": ["number", "null"]}
        }
    })
}

/// Returns the `SCHEMA` message announcing the stream.
#[must_use]
pub fn schema_message() -> Message {
    Message::Schema {
        stream: STREAM_NAME.to_string(),
        schema: record_schema(),
        key_properties: PRIMARY_KEYS.iter().map(ToString::to_string).collect(),
        bookmark_properties: vec![REPLICATION_KEY.to_string()],
    }
}
