//! Error types for `chronicle-core`.
//!
//! This is the taxonomy callers of the archive see. Store backends keep their
//! own richer error types and convert into this one.

use thiserror::Error;

use crate::chronicle::ChronicleId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("chronicle has no identity; it must be created before it is updated")]
  MissingIdentity,

  #[error("invalid record: chronicle {0} does not exist in the store")]
  InvalidRecord(ChronicleId),

  #[error("chronicle not found: {0}")]
  NotFound(ChronicleId),

  /// The search index cannot be read or written. Recover with a full rebuild
  /// from the store.
  #[error("search index unavailable: {0}")]
  IndexUnavailable(String),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
