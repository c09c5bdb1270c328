//! `chronicle` — command-line front end for a personal chronicle archive.
//!
//! # Usage
//!
//! ```text
//! chronicle new --title "The Long March" --type article --tag travel
//! chronicle search march --year 2023
//! chronicle --config ~/.config/chronicle/chronicle.toml export --out backup.json
//! ```
//!
//! Settings come from `chronicle.toml` (or `--config`) and `CHRONICLE_*`
//! environment variables. Logs go to stderr; `RUST_LOG` overrides the level.

mod commands;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chronicle_archive::Archive;
use chronicle_store_sqlite::SqliteStore;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, settings::Settings};

#[derive(Parser, Debug)]
#[command(name = "chronicle", version, about = "Personal chronicle archive")]
struct Cli {
  /// Path to the TOML settings file.
  #[arg(short, long, value_name = "FILE", default_value = "chronicle.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  let archive = Archive::open(store, settings.archive)
    .await
    .context("failed to open archive")?;

  commands::run(&archive, cli.command).await
}
