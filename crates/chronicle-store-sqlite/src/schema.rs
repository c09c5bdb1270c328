//! SQL schema for the chronicle SQLite store.
//!
//! Migrations are applied in order at connection startup, gated on
//! `PRAGMA user_version`. Step `n` (1-based) brings the database to version
//! `n`. Steps are append-only: never edit one that has shipped.

/// Per-connection settings; not part of any migration.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Version 1: chronicles without a type column, plus the vocabulary table.
const V1_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS chronicles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    subtitle    TEXT NOT NULL DEFAULT '',
    content     TEXT NOT NULL DEFAULT '',   -- markup, never parsed here
    cover_ref   TEXT,                       -- at most one of *_ref / *_blob
    cover_blob  BLOB,
    audio_ref   TEXT,
    audio_blob  BLOB,
    tags        TEXT NOT NULL DEFAULT '[]', -- JSON array, duplicate-free
    created_at  TEXT NOT NULL,              -- RFC 3339 UTC, nanosecond width
    updated_at  TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'draft'
);

CREATE INDEX IF NOT EXISTS chronicles_created_idx ON chronicles(created_at);
CREATE INDEX IF NOT EXISTS chronicles_status_idx  ON chronicles(status);

-- Sibling table; the archive engine stores it but gives it no behaviour.
CREATE TABLE IF NOT EXISTS vocabulary (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    word        TEXT NOT NULL,
    word_group  TEXT NOT NULL DEFAULT '',
    tags        TEXT NOT NULL DEFAULT '[]',
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS vocabulary_word_idx  ON vocabulary(word);
CREATE INDEX IF NOT EXISTS vocabulary_group_idx ON vocabulary(word_group);
";

/// Version 2: entry type. Existing rows become `chronicle`.
const V2_ENTRY_TYPE: &str = "
ALTER TABLE chronicles ADD COLUMN entry_type TEXT NOT NULL DEFAULT 'chronicle';

UPDATE chronicles
   SET entry_type = 'chronicle'
 WHERE entry_type NOT IN ('chronicle', 'article', 'idea', 'thought');

CREATE INDEX IF NOT EXISTS chronicles_type_idx ON chronicles(entry_type);
";

/// All migration steps, oldest first.
pub const MIGRATIONS: &[&str] = &[V1_INITIAL, V2_ENTRY_TYPE];

/// The version a fully migrated database reports.
pub fn latest_version() -> u32 { MIGRATIONS.len() as u32 }

/// Apply every step newer than the database's `user_version`, each in its own
/// transaction. Returns the version found before migrating; the caller rejects
/// versions newer than [`latest_version`].
pub fn migrate(conn: &mut rusqlite::Connection) -> rusqlite::Result<u32> {
  conn.execute_batch(PRAGMAS)?;

  let found: u32 =
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

  for (step, sql) in MIGRATIONS.iter().enumerate().skip(found as usize) {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.execute_batch(&format!("PRAGMA user_version = {};", step + 1))?;
    tx.commit()?;
  }

  Ok(found)
}
