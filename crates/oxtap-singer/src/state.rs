//! Incremental bookmark state.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use oxtap_types::DATE_FORMAT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, SingerError, error::read_json};

/// Singer state document: `{"bookmarks": {"<stream>": {...}}}`.
///
/// Keys this tap does not use are preserved, so a state written by another
/// tool round-trips unchanged apart from the bookmarks we advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TapState {
    /// Per-stream bookmarks.
    #[serde(default)]
    pub bookmarks: BTreeMap<String, Bookmark>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Bookmark of a single stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Record field the bookmark tracks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// Last fully processed value of that field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TapState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Returns the last completed date for `stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not a `YYYY-MM-DD` date.
    pub fn bookmark(&self, stream: &str) -> Result<Option<NaiveDate>> {
        let Some(value) = self
            .bookmarks
            .get(stream)
            .and_then(|b| b.replication_key_value.as_deref())
        else {
            return Ok(None);
        };

        // Accept full timestamps too; only the date part matters.
        let date_part = value.get(..10).unwrap_or(value);
        NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map(Some)
            .map_err(|_| SingerError::InvalidBookmark {
                stream: stream.to_string(),
                value: value.to_string(),
            })
    }

    /// Moves the bookmark of `stream` to `date` if that is later than the
    /// current one. Returns true if the bookmark changed.
    ///
    /// An unreadable existing value is overwritten.
    pub fn advance(&mut self, stream: &str, replication_key: &str, date: NaiveDate) -> bool {
        if matches!(self.bookmark(stream), Ok(Some(current)) if current >= date) {
            return false;
        }

        let bookmark = self.bookmarks.entry(stream.to_string()).or_default();
        bookmark.replication_key = Some(replication_key.to_string());
        bookmark.replication_key_value = Some(date.format(DATE_FORMAT).to_string());
        true
    }
}
