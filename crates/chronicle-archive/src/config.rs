//! Archive configuration, deserialised by the host application.

use chronicle_core::chronicle::Status;
use serde::Deserialize;

/// Policy knobs for the archive facade.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  /// Status given to new chronicles that do not specify one.
  pub default_status: Status,
  /// Title given to new chronicles that do not specify one.
  pub default_title:  String,
  /// Upper bound on ranked results from [`crate::Archive::search_ids`].
  /// Never applied to filtering.
  pub search_limit:   usize,
}

impl Default for ArchiveConfig {
  fn default() -> Self {
    Self {
      default_status: Status::Draft,
      default_title:  "Untitled".to_owned(),
      search_limit:   50,
    }
  }
}
