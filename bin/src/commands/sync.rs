//! Sync command implementation.
//!
//! Streams daily snapshots from the API and writes them to stdout as Singer
//! messages, checkpointing the bookmark after every day.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use log::{debug, info};
use oxtap_lib::{
    ApiClient, Catalog, ConfigSource, DatePaginator, REPLICATION_KEY, RequestBuilder,
    RequestContext, STREAM_NAME, SingerWriter, TapConfig, TapState, page_stream,
};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::pin::pin;

/// Runs a sync with the given config sources, state and catalog files.
pub(crate) async fn sync(
    sources: &[ConfigSource],
    state_path: Option<&Path>,
    catalog_path: Option<&Path>,
) -> Result<()> {
    let config = TapConfig::load(sources).context("Failed to load configuration")?;
    debug!("Loaded {config:?}");

    let catalog = catalog_path
        .map(|path| {
            Catalog::load(path).with_context(|| format!("Failed to load catalog {}", path.display()))
        })
        .transpose()?;

    let state = match state_path {
        Some(path) => TapState::load(path)
            .with_context(|| format!("Failed to load state {}", path.display()))?,
        None => TapState::new(),
    };

    let client = ApiClient::with_defaults().context("Failed to create HTTP client")?;
    let mut writer = SingerWriter::new(BufWriter::new(io::stdout()));

    run(
        &client,
        config,
        catalog.as_ref(),
        state,
        DatePaginator::from_clock(),
        &mut writer,
    )
    .await?;

    Ok(())
}

/// Emits `SCHEMA`, then for each day its `RECORD`s followed by a `STATE`.
///
/// On a page error the last `STATE` written still describes every record
/// emitted before it. Returns the final state.
pub(crate) async fn run<W: Write>(
    client: &ApiClient,
    config: TapConfig,
    catalog: Option<&Catalog>,
    mut state: TapState,
    paginator: DatePaginator,
    writer: &mut SingerWriter<W>,
) -> Result<TapState> {
    if catalog.is_some_and(|catalog| !catalog.is_selected(STREAM_NAME)) {
        info!("Stream '{STREAM_NAME}' is not selected, nothing to sync");
        return Ok(state);
    }

    let bookmark = state
        .bookmark(STREAM_NAME)
        .context("Invalid bookmark in state")?;
    let context = RequestContext::new().with_bookmark(bookmark);
    let builder = RequestBuilder::new(config);

    info!(
        "Syncing '{STREAM_NAME}' from {} up to {}",
        builder.start_token(&context),
        paginator.today()
    );

    writer.write_schema()?;
    writer.flush()?;

    let mut pages = pin!(page_stream(client, &builder, paginator, context));
    let mut days = 0u64;

    while let Some(page) = pages.next().await {
        let page = page.context("Failed to fetch exchange rates")?;

        writer.write_rows(&page.rows, Utc::now())?;
        state.advance(STREAM_NAME, REPLICATION_KEY, page.date);
        writer.write_state(&state)?;
        days += 1;
    }

    if days == 0 {
        writer.write_state(&state)?;
    }

    info!(
        "Synced {} records over {days} days",
        writer.records_written()
    );

    Ok(state)
}
