//! Singer protocol messages.

use chrono::{DateTime, Utc};
use oxtap_types::RateRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TapState};

/// One line of Singer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Describes the records of a stream.
    Schema {
        /// Stream name.
        stream: String,
        /// JSON schema of each record.
        schema: Value,
        /// Primary key columns.
        key_properties: Vec<String>,
        /// Columns used as the incremental bookmark.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bookmark_properties: Vec<String>,
    },
    /// A single extracted record.
    Record {
        /// Stream name.
        stream: String,
        /// The record itself.
        record: Value,
        /// When the record was extracted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_extracted: Option<DateTime<Utc>>,
    },
    /// Checkpoint to resume from.
    State {
        /// Opaque state document.
        value: Value,
    },
}

impl Message {
    /// Creates a `RECORD` message for a rate row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized.
    pub fn record(stream: &str, row: &RateRow, time_extracted: DateTime<Utc>) -> Result<Self> {
        Ok(Self::Record {
            stream: stream.to_string(),
            record: serde_json::to_value(row)?,
            time_extracted: Some(time_extracted),
        })
    }

    /// Creates a `STATE` message.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn state(state: &TapState) -> Result<Self> {
        Ok(Self::State {
            value: serde_json::to_value(state)?,
        })
    }
}
