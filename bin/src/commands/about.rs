//! `--about` command.

use anyhow::Result;
use clap::ValueEnum;
use oxtap_lib::About;

/// Output format for the `--about` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum AboutFormat {
    Json,
    Markdown,
}

/// Renders the tap description in the requested format.
pub(crate) fn render(about: &About, format: AboutFormat) -> Result<String> {
    Ok(match format {
        AboutFormat::Json => serde_json::to_string_pretty(about)?,
        AboutFormat::Markdown => about.to_markdown(),
    })
}

/// Prints the tap description to stdout.
pub(crate) fn about(format: AboutFormat) -> Result<()> {
    println!("{}", render(&About::default(), format)?);
    Ok(())
}
