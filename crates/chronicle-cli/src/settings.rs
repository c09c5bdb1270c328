//! Layered settings: an optional TOML file under `CHRONICLE_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chronicle_archive::ArchiveConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
  pub archive:    ArchiveConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("chronicles.db"),
      archive:    ArchiveConfig::default(),
    }
  }
}

impl Settings {
  /// Read `file` if it exists, then apply the environment on top, e.g.
  /// `CHRONICLE_STORE_PATH` or `CHRONICLE_ARCHIVE__SEARCH_LIMIT`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("CHRONICLE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .with_context(|| format!("failed to read settings from {}", file.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
