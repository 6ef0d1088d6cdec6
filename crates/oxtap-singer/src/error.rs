//! Errors for Singer message output and state/catalog files.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Singer operations.
pub type Result<T> = std::result::Result<T, SingerError>;

/// Errors that can occur while reading or writing Singer artifacts.
#[derive(Error, Debug)]
pub enum SingerError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse a JSON file.
    #[error("Failed to parse '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A bookmark value is not a `YYYY-MM-DD` date.
    #[error("Invalid bookmark for stream '{stream}': {value:?}")]
    InvalidBookmark {
        /// Stream the bookmark belongs to.
        stream: String,
        /// The rejected value.
        value: String,
    },

    /// I/O error while writing messages.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and deserializes a JSON file, attaching the path to any error.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| SingerError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| SingerError::ParseJson {
        path: path.to_path_buf(),
        source: e,
    })
}
