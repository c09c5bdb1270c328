//! [`Archive`] — the facade over the store and its search index.

use std::{
  collections::BTreeSet,
  sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{Local, TimeZone, Utc};
use chronicle_core::{
  chronicle::{Chronicle, ChronicleId, EntryType, NewChronicle},
  store::{ChronicleStore, SortDirection},
  Error, Result,
};
use uuid::Uuid;

use crate::{
  config::ArchiveConfig,
  index::SearchIndex,
  query::{self, CalendarSpan, ChronicleFilter, GroupedChronicles},
};

// ─── Audit ───────────────────────────────────────────────────────────────────

/// Disagreement between the store and the search index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexAudit {
  /// Stored but not indexed.
  pub missing:  Vec<ChronicleId>,
  /// Indexed but no longer stored.
  pub orphaned: Vec<ChronicleId>,
}

impl IndexAudit {
  pub fn is_consistent(&self) -> bool {
    self.missing.is_empty() && self.orphaned.is_empty()
  }
}

// ─── Archive ─────────────────────────────────────────────────────────────────

/// The archive engine's only public surface.
///
/// Every mutation commits to the store first and projects into the index
/// second, with no suspension point in between; once a call returns, `list`
/// and `search` agree. Callers must not issue concurrent mutations.
///
/// Calendar computations (year filters, grouping, month listings) use `Tz`,
/// the local zone unless opened with [`Archive::open_with_timezone`].
pub struct Archive<S, Tz: TimeZone = Local> {
  store:  S,
  index:  RwLock<SearchIndex>,
  config: ArchiveConfig,
  tz:     Tz,
}

impl<S: ChronicleStore> Archive<S, Local> {
  /// Wrap `store` and build the search index from its contents.
  pub async fn open(store: S, config: ArchiveConfig) -> Result<Self> {
    Self::open_with_timezone(store, config, Local).await
  }
}

impl<S: ChronicleStore, Tz: TimeZone> Archive<S, Tz> {
  /// Like [`Archive::open`], with calendar computations done in `tz`.
  pub async fn open_with_timezone(
    store: S,
    config: ArchiveConfig,
    tz: Tz,
  ) -> Result<Self> {
    let archive = Self {
      store,
      index: RwLock::new(SearchIndex::new()),
      config,
      tz,
    };
    archive.rebuild_index().await?;
    Ok(archive)
  }

  pub fn config(&self) -> &ArchiveConfig { &self.config }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Materialise `new` with defaults, persist it, then index it.
  pub async fn create(&self, new: NewChronicle) -> Result<Chronicle> {
    let now = Utc::now();
    let created_at = new.created_at.unwrap_or(now);

    let mut record = Chronicle {
      id:          None,
      uuid:        Uuid::new_v4(),
      title:       new
        .title
        .unwrap_or_else(|| self.config.default_title.clone()),
      subtitle:    new.subtitle.unwrap_or_default(),
      content:     new.content.unwrap_or_default(),
      entry_type:  new.entry_type.unwrap_or_default(),
      cover_image: new.cover_image,
      audio_file:  new.audio_file,
      tags:        new.tags.into_iter().collect(),
      created_at,
      updated_at:  created_at.max(now),
      status:      new.status.unwrap_or(self.config.default_status),
    };

    let id = self.store.put(&record).await.map_err(fault)?;
    record.id = Some(id);
    self.index_write()?.index(&record);

    tracing::debug!(%id, uuid = %record.uuid, "created chronicle");
    Ok(record)
  }

  /// Persist a full replacement of an existing record, then re-index it.
  ///
  /// `uuid` and `created_at` are taken from the stored record whatever the
  /// caller passes; `updated_at` moves forward past both the caller's and the
  /// stored value. An identity with no stored record is `InvalidRecord`.
  pub async fn update(&self, mut record: Chronicle) -> Result<Chronicle> {
    let id = record.id.ok_or(Error::MissingIdentity)?;
    let stored = self
      .store
      .get(id)
      .await
      .map_err(fault)?
      .ok_or(Error::InvalidRecord(id))?;

    record.uuid = stored.uuid;
    record.created_at = stored.created_at;
    record.updated_at = record.updated_at.max(stored.updated_at);
    record.restamp(Utc::now());

    self.store.put(&record).await.map_err(fault)?;
    self.index_write()?.index(&record);

    tracing::debug!(%id, uuid = %record.uuid, "updated chronicle");
    Ok(record)
  }

  /// Remove a record from the store, then from the index. If the store has no
  /// such record the index is left alone and `NotFound` is returned.
  pub async fn delete(&self, id: ChronicleId) -> Result<()> {
    self.store.delete(id).await.map_err(fault)?;
    self.index_write()?.remove(id);

    tracing::debug!(%id, "deleted chronicle");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn get(&self, id: ChronicleId) -> Result<Option<Chronicle>> {
    self.store.get(id).await.map_err(fault)
  }

  /// Newest-first chronicles, optionally restricted by type and year.
  pub async fn list(
    &self,
    entry_type: Option<EntryType>,
    year: Option<i32>,
  ) -> Result<Vec<Chronicle>> {
    let filter = ChronicleFilter { entry_type, year, query: None };
    let records = self.all_newest_first().await?;
    Ok(query::narrow(records, &filter, None, &self.tz))
  }

  /// Filter by type, then free text, then year, and group what remains by
  /// year. The index is consulted only as a membership test.
  pub async fn search(&self, filter: &ChronicleFilter) -> Result<GroupedChronicles> {
    let records = self.all_newest_first().await?;

    let text_matches = match filter.text() {
      Some(text) => Some(self.index_read()?.matches(text)),
      None => None,
    };

    let narrowed =
      query::narrow(records, filter, text_matches.as_ref(), &self.tz);
    Ok(query::group_by_year(narrowed, &self.tz))
  }

  /// Relevance-ranked identities for `text`, at most `search_limit` of them.
  pub fn search_ids(&self, text: &str) -> Result<Vec<ChronicleId>> {
    Ok(self.index_read()?.search(text, self.config.search_limit))
  }

  /// Years that have at least one chronicle, newest first.
  pub async fn available_years(&self) -> Result<Vec<i32>> {
    let records = self.all_newest_first().await?;
    Ok(query::distinct_years(&records, &self.tz))
  }

  /// Chronicles created in a calendar month (1-based), newest first. An
  /// impossible month yields nothing.
  pub async fn list_month(&self, year: i32, month: u32) -> Result<Vec<Chronicle>> {
    let Some(span) = CalendarSpan::month(year, month, &self.tz) else {
      return Ok(Vec::new());
    };
    self
      .store
      .list_created_between(span.start, span.end)
      .await
      .map_err(fault)
  }

  // ── Index maintenance ─────────────────────────────────────────────────────

  /// Discard the index and re-index every stored record. Also recovers an
  /// index left unavailable by a panic. Returns the number indexed.
  pub async fn rebuild_index(&self) -> Result<usize> {
    let records = self.all_newest_first().await?;

    let mut fresh = SearchIndex::new();
    for record in &records {
      fresh.index(record);
    }

    let mut guard = self.index.write().unwrap_or_else(|poisoned| {
      tracing::warn!("search index was unavailable; replacing it");
      self.index.clear_poison();
      poisoned.into_inner()
    });
    *guard = fresh;

    tracing::info!(count = records.len(), "rebuilt search index");
    Ok(records.len())
  }

  /// Compare indexed identities with stored ones.
  pub async fn audit_index(&self) -> Result<IndexAudit> {
    let stored: BTreeSet<ChronicleId> = self
      .all_newest_first()
      .await?
      .iter()
      .filter_map(|c| c.id)
      .collect();
    let indexed: BTreeSet<ChronicleId> = self.index_read()?.ids().collect();

    Ok(IndexAudit {
      missing:  stored.difference(&indexed).copied().collect(),
      orphaned: indexed.difference(&stored).copied().collect(),
    })
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn all_newest_first(&self) -> Result<Vec<Chronicle>> {
    self
      .store
      .list_all(SortDirection::Descending)
      .await
      .map_err(fault)
  }

  fn index_read(&self) -> Result<RwLockReadGuard<'_, SearchIndex>> {
    self.index.read().map_err(|_| unavailable())
  }

  fn index_write(&self) -> Result<RwLockWriteGuard<'_, SearchIndex>> {
    self.index.write().map_err(|_| unavailable())
  }
}

fn fault<E: Into<Error>>(err: E) -> Error { err.into() }

fn unavailable() -> Error {
  Error::IndexUnavailable("a writer panicked; rebuild the index".to_owned())
}
