//! Rust library for extracting Open Exchange Rates history as Singer streams.
//!
//! This is a facade crate that re-exports functionality from the oxtap
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use oxtap_lib::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TapConfig::load(&[ConfigSource::from("config.json")])?;
//!     let client = ApiClient::with_defaults()?;
//!     let builder = RequestBuilder::new(config);
//!
//!     let mut pages = page_stream(&client, &builder, DatePaginator::from_clock(), RequestContext::new());
//!     while let Some(page) = pages.next().await {
//!         let page = page?;
//!         println!("{}: {} rates", page.date, page.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use oxtap_types::*;

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use oxtap_fetch::{
    ApiClient, ClientConfig, DatePaginator, FetchError, Page, flatten, flatten_bytes, page_stream,
    url::{PreparedRequest, RequestBuilder, RequestContext, TemplateKey},
};

// Re-export Singer protocol support
#[cfg(feature = "singer")]
pub use oxtap_singer::{
    About, Catalog, Message, SingerError, SingerWriter, TapState,
    stream::{PRIMARY_KEYS, REPLICATION_KEY, STREAM_NAME},
};

/// Prelude module for convenient imports.
///
/// ```
/// use oxtap_lib::prelude::*;
/// ```
pub mod prelude {
    pub use oxtap_types::{
        ConfigSource, PageToken, RateRow, Result, Snapshot, TapConfig, TapError,
    };

    #[cfg(feature = "fetch")]
    pub use oxtap_fetch::{
        ApiClient, ClientConfig, DatePaginator, Page, flatten, page_stream,
        url::{RequestBuilder, RequestContext},
    };

    #[cfg(feature = "singer")]
    pub use oxtap_singer::{Catalog, SingerWriter, TapState, stream::STREAM_NAME};
}
