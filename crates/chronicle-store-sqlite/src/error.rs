//! Error type for `chronicle-store-sqlite`.

use chronicle_core::chronicle::ChronicleId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] chronicle_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The database was written by a newer version of this crate.
  #[error("unsupported schema version {found}, newest known is {known}")]
  UnsupportedSchema { found: u32, known: u32 },

  /// An update addressed an identity with no row.
  #[error("invalid record: chronicle {0} does not exist")]
  InvalidRecord(ChronicleId),

  #[error("chronicle not found: {0}")]
  NotFound(ChronicleId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for chronicle_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(inner) => inner,
      Error::InvalidRecord(id) => Self::InvalidRecord(id),
      Error::NotFound(id) => Self::NotFound(id),
      other => Self::Store(Box::new(other)),
    }
  }
}
