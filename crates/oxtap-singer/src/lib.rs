//! Singer protocol support for the oxtap connector.
//!
//! This crate provides everything the tap writes or reads besides the API itself:
//!
//! - [`Message`] - `SCHEMA`, `RECORD` and `STATE` messages
//! - [`SingerWriter`] - NDJSON message output
//! - [`Catalog`] - Discovery output and stream selection
//! - [`TapState`] - Incremental bookmarks
//! - [`About`] - The `--about` document

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod about;
mod catalog;
mod error;
mod message;
mod state;
pub mod stream;
mod writer;

pub use about::{About, CAPABILITIES, TAP_NAME, settings_schema};
pub use catalog::{Catalog, CatalogEntry, MetadataEntry};
pub use error::{Result, SingerError};
pub use message::Message;
pub use state::{Bookmark, TapState};
pub use writer::SingerWriter;
