//! `--discover` command.

use anyhow::Result;
use oxtap_lib::Catalog;

/// Prints the catalog of available streams to stdout.
pub(crate) fn discover() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Catalog::discover())?);
    Ok(())
}
