//! The `ChronicleStore` trait — durable keyed storage for chronicles.
//!
//! The trait is implemented by storage backends (e.g.
//! `chronicle-store-sqlite`). The archive engine depends on this abstraction,
//! not on any concrete backend. A store never touches the search index.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::chronicle::{Chronicle, ChronicleId};

/// Direction for [`ChronicleStore::list_all`]; ordering is always by
/// `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  Ascending,
  /// Newest first, the store's native order.
  #[default]
  Descending,
}

/// Abstraction over a chronicle store backend.
///
/// Backend errors must convert into [`crate::Error`] so that the archive can
/// surface them without knowing the backend; `InvalidRecord` and `NotFound`
/// must map onto the variants of the same name.
pub trait ChronicleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Persist a full record.
  ///
  /// If `record.id` is `None` a new identity is assigned and returned. If it
  /// is set, the existing row is replaced; an identity with no row fails with
  /// an invalid-record error.
  fn put<'a>(
    &'a self,
    record: &'a Chronicle,
  ) -> impl Future<Output = Result<ChronicleId, Self::Error>> + Send + 'a;

  /// Retrieve a record by identity. Returns `None` if not found.
  fn get(
    &self,
    id: ChronicleId,
  ) -> impl Future<Output = Result<Option<Chronicle>, Self::Error>> + Send + '_;

  /// Delete a record. Fails with a not-found error if no row was removed.
  fn delete(
    &self,
    id: ChronicleId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every record ordered by `created_at`. Records created at the same
  /// instant are ordered by identity in the same direction.
  fn list_all(
    &self,
    direction: SortDirection,
  ) -> impl Future<Output = Result<Vec<Chronicle>, Self::Error>> + Send + '_;

  /// Records with `from <= created_at < until`, newest first.
  fn list_created_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Chronicle>, Self::Error>> + Send + '_;
}
