//! Core types for the oxtap Open Exchange Rates connector.
//!
//! This crate provides the data structures shared by the rest of the workspace:
//!
//! - [`Snapshot`] - One day's response from the historical endpoint
//! - [`RateRow`] - A single flattened output record
//! - [`PageToken`] - The calendar day to request next
//! - [`TapConfig`] - Layered, validated run configuration

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod page_token;
mod settings;
mod snapshot;

pub use error::{ConfigError, Result, TapError, TemplateError};
pub use page_token::{DATE_FORMAT, PageToken, date_from_timestamp};
pub use settings::{ConfigSource, DEFAULT_API_URL, ENV_PREFIX, TapConfig};
pub use snapshot::{RateRow, RateRows, Snapshot};
