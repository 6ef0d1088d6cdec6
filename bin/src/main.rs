//! oxtap CLI - Singer tap for Open Exchange Rates historical exchange rates.

use anyhow::Result;
use clap::Parser;
use oxtap_lib::ConfigSource;
use std::path::PathBuf;

mod commands;

use commands::about::AboutFormat;

#[derive(Parser, Debug)]
#[command(name = "oxtap")]
#[command(about = "Singer tap for Open Exchange Rates historical exchange rates", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file, or ENV to read settings from the environment only. May be repeated.
    #[arg(long, value_name = "FILE|ENV")]
    config: Vec<String>,

    /// State file with bookmarks from a previous run
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Catalog file selecting the streams to sync
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Print the catalog and exit
    #[arg(long, conflicts_with = "about")]
    discover: bool,

    /// Print tap information and exit
    #[arg(long)]
    about: bool,

    /// Output format for --about
    #[arg(long, value_enum, default_value = "json")]
    format: AboutFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Config sources in the order given. Without `--config` only the
    /// environment is read.
    fn config_sources(&self) -> Vec<ConfigSource> {
        if self.config.is_empty() {
            return vec![ConfigSource::Env];
        }
        self.config
            .iter()
            .map(|s| ConfigSource::from(s.as_str()))
            .collect()
    }
}

/// Maps `-v` occurrences to a log filter. `RUST_LOG` takes precedence.
const fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Logs go to stderr; stdout carries Singer messages only.
fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(verbose)))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.about {
        return commands::about::about(cli.format);
    }

    if cli.discover {
        return commands::discover::discover();
    }

    commands::sync::sync(
        &cli.config_sources(),
        cli.state.as_deref(),
        cli.catalog.as_deref(),
    )
    .await
}
