//! Error types for oxtap.

use std::path::PathBuf;

use thiserror::Error;

use crate::PageToken;

/// Result type alias for oxtap operations.
pub type Result<T> = std::result::Result<T, TapError>;

/// Errors that can occur while extracting exchange rates.
#[derive(Error, Debug)]
pub enum TapError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body is missing an expected key or has the wrong shape.
    #[error("Malformed response: `{key}` {reason}")]
    MalformedResponse {
        /// The offending key (or `$` for the whole body).
        key: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Request URL template could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Invalid or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The paginator produced a token that does not move forward.
    #[error("Pagination loop detected: next token {next} does not advance past {previous}")]
    PaginationLoop {
        /// Token of the page that was just processed.
        previous: PageToken,
        /// Token the paginator asked for next.
        next: PageToken,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TapError {
    /// Shorthand for a [`TapError::MalformedResponse`].
    #[must_use]
    pub fn malformed(key: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedResponse {
            key: key.into(),
            reason,
        }
    }
}

/// Errors raised while rendering a request path template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholder name is not one of the known keys.
    #[error("Unknown placeholder `{{{0}}}` in URL template")]
    UnknownPlaceholder(String),

    /// Placeholder is known but neither the context nor the config provides it.
    #[error("No value for placeholder `{{{0}}}` in URL template")]
    MissingValue(&'static str),

    /// A `{` without a matching `}`.
    #[error("Unterminated placeholder in URL template: {0}")]
    Unterminated(String),
}

/// Errors raised while loading or validating the tap configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Layered sources could not be merged or deserialized.
    #[error("Invalid configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// `app_id` is present but blank.
    #[error("`app_id` must not be empty")]
    EmptyAppId,

    /// `symbols` was given as an empty list.
    #[error("`symbols` must list at least one currency code")]
    EmptySymbols,

    /// A currency code is not three uppercase ASCII letters.
    #[error("`{field}` has invalid currency code {value:?} (expected 3 uppercase letters)")]
    InvalidCurrency {
        /// Which setting held the code.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `api_url` is not an http(s) URL.
    #[error("`api_url` must start with http:// or https://, got {0:?}")]
    InvalidApiUrl(String),
}
