//! [`SqliteStore`] — the SQLite implementation of [`ChronicleStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use chronicle_core::{
  chronicle::{Chronicle, ChronicleId},
  store::{ChronicleStore, SortDirection},
};

use crate::{
  encode::{encode_dt, ChronicleParams, RawChronicle, CHRONICLE_COLUMNS},
  schema, Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A chronicle store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  /// Wrap an already-open connection, migrating it to the latest schema.
  pub(crate) async fn from_connection(
    conn: tokio_rusqlite::Connection,
  ) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found = self
      .conn
      .call(|conn| Ok(schema::migrate(conn)?))
      .await?;

    let known = schema::latest_version();
    if found > known {
      return Err(Error::UnsupportedSchema { found, known });
    }
    Ok(())
  }

  /// The `user_version` the database currently reports.
  pub async fn schema_version(&self) -> Result<u32> {
    let version = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
      })
      .await?;
    Ok(version)
  }

  /// Run a `SELECT` over `chronicles` and decode every row.
  async fn select_many(
    &self,
    sql: String,
    bounds: Option<(String, String)>,
  ) -> Result<Vec<Chronicle>> {
    let raws: Vec<RawChronicle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match &bounds {
          Some((from, until)) => stmt
            .query_map(rusqlite::params![from, until], RawChronicle::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawChronicle::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChronicle::into_chronicle).collect()
  }

  async fn insert(&self, p: ChronicleParams) -> Result<ChronicleId> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chronicles (
             uuid, title, subtitle, content, entry_type,
             cover_ref, cover_blob, audio_ref, audio_blob,
             tags, created_at, updated_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            p.uuid,
            p.title,
            p.subtitle,
            p.content,
            p.entry_type,
            p.cover_ref,
            p.cover_blob.as_deref(),
            p.audio_ref,
            p.audio_blob.as_deref(),
            p.tags,
            p.created_at,
            p.updated_at,
            p.status,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(ChronicleId(id))
  }

  async fn replace(&self, id: ChronicleId, p: ChronicleParams) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE chronicles SET
             uuid = ?2, title = ?3, subtitle = ?4, content = ?5,
             entry_type = ?6, cover_ref = ?7, cover_blob = ?8,
             audio_ref = ?9, audio_blob = ?10, tags = ?11,
             created_at = ?12, updated_at = ?13, status = ?14
           WHERE id = ?1",
          rusqlite::params![
            id.0,
            p.uuid,
            p.title,
            p.subtitle,
            p.content,
            p.entry_type,
            p.cover_ref,
            p.cover_blob.as_deref(),
            p.audio_ref,
            p.audio_blob.as_deref(),
            p.tags,
            p.created_at,
            p.updated_at,
            p.status,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::InvalidRecord(id));
    }
    Ok(())
  }
}

// ─── ChronicleStore impl ─────────────────────────────────────────────────────

impl ChronicleStore for SqliteStore {
  type Error = Error;

  async fn put(&self, record: &Chronicle) -> Result<ChronicleId> {
    let params = ChronicleParams::from_chronicle(record)?;
    match record.id {
      None => self.insert(params).await,
      Some(id) => {
        self.replace(id, params).await?;
        Ok(id)
      }
    }
  }

  async fn get(&self, id: ChronicleId) -> Result<Option<Chronicle>> {
    let sql = format!("SELECT {CHRONICLE_COLUMNS} FROM chronicles WHERE id = ?1");

    let raw: Option<RawChronicle> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.0], RawChronicle::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChronicle::into_chronicle).transpose()
  }

  async fn delete(&self, id: ChronicleId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM chronicles WHERE id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn list_all(&self, direction: SortDirection) -> Result<Vec<Chronicle>> {
    let dir = match direction {
      SortDirection::Ascending => "ASC",
      SortDirection::Descending => "DESC",
    };
    let sql = format!(
      "SELECT {CHRONICLE_COLUMNS} FROM chronicles
       ORDER BY created_at {dir}, id {dir}"
    );
    self.select_many(sql, None).await
  }

  async fn list_created_between(
    &self,
    from:  DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<Chronicle>> {
    let sql = format!(
      "SELECT {CHRONICLE_COLUMNS} FROM chronicles
       WHERE created_at >= ?1 AND created_at < ?2
       ORDER BY created_at DESC, id DESC"
    );
    self
      .select_many(sql, Some((encode_dt(from), encode_dt(until))))
      .await
  }
}
