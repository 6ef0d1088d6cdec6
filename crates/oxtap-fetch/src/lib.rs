//! Request building, pagination and HTTP transport for the oxtap connector.
//!
//! This crate provides the extraction pipeline for the historical endpoint:
//!
//! - [`url::RequestBuilder`] - Builds `/historical/<date>.json` requests
//! - [`DatePaginator`] - Decides which day to fetch next
//! - [`flatten`] - Expands a snapshot into rate rows
//! - [`ApiClient`] - HTTP client with timeouts and retries
//! - [`page_stream`] - Sequential day-by-day page stream

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod paginate;
mod parse;
mod stream;
pub mod url;

pub use client::{ApiClient, ClientConfig, FetchError};
pub use paginate::{DatePaginator, TIMESTAMP_KEY};
pub use parse::{flatten, flatten_bytes};
pub use stream::{Page, page_stream};
