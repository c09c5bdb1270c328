//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (nanosecond
//! precision, `Z` suffix) so that text order equals time order. Tags are a
//! compact JSON array. UUIDs are hyphenated lowercase strings.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use chronicle_core::{
  attachment::{Attachment, Payload},
  chronicle::{Chronicle, ChronicleId, EntryType, Status},
  tags::Tags,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse()
    .map_err(|_| chronicle_core::Error::UnknownStatus(s.to_owned()).into())
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &Tags) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Tags> { Ok(serde_json::from_str(s)?) }

// ─── Attachment ──────────────────────────────────────────────────────────────

/// Split an attachment into its `(ref, blob)` column pair.
pub fn encode_attachment(a: &Attachment) -> (Option<String>, Option<Bytes>) {
  match a {
    Attachment::Absent => (None, None),
    Attachment::Reference(r) => (Some(r.clone()), None),
    Attachment::Payload(p) => (None, Some(p.bytes())),
  }
}

pub fn decode_attachment(
  reference: Option<String>,
  blob: Option<Vec<u8>>,
) -> Attachment {
  match (reference, blob) {
    (Some(r), _) => Attachment::Reference(r),
    (None, Some(b)) => Attachment::Payload(Payload::new(b)),
    (None, None) => Attachment::Absent,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawChronicle::from_row`].
pub const CHRONICLE_COLUMNS: &str = "id, uuid, title, subtitle, content, \
  entry_type, cover_ref, cover_blob, audio_ref, audio_blob, tags, \
  created_at, updated_at, status";

/// Raw values read directly from a `chronicles` row.
pub struct RawChronicle {
  pub id:         i64,
  pub uuid:       String,
  pub title:      String,
  pub subtitle:   String,
  pub content:    String,
  pub entry_type: Option<String>,
  pub cover_ref:  Option<String>,
  pub cover_blob: Option<Vec<u8>>,
  pub audio_ref:  Option<String>,
  pub audio_blob: Option<Vec<u8>>,
  pub tags:       String,
  pub created_at: String,
  pub updated_at: String,
  pub status:     String,
}

impl RawChronicle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      uuid:       row.get(1)?,
      title:      row.get(2)?,
      subtitle:   row.get(3)?,
      content:    row.get(4)?,
      entry_type: row.get(5)?,
      cover_ref:  row.get(6)?,
      cover_blob: row.get(7)?,
      audio_ref:  row.get(8)?,
      audio_blob: row.get(9)?,
      tags:       row.get(10)?,
      created_at: row.get(11)?,
      updated_at: row.get(12)?,
      status:     row.get(13)?,
    })
  }

  pub fn into_chronicle(self) -> Result<Chronicle> {
    Ok(Chronicle {
      id:          Some(ChronicleId(self.id)),
      uuid:        decode_uuid(&self.uuid)?,
      title:       self.title,
      subtitle:    self.subtitle,
      content:     self.content,
      entry_type:  EntryType::from_stored(self.entry_type.as_deref()),
      cover_image: decode_attachment(self.cover_ref, self.cover_blob),
      audio_file:  decode_attachment(self.audio_ref, self.audio_blob),
      tags:        decode_tags(&self.tags)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      status:      decode_status(&self.status)?,
    })
  }
}

/// Owned column values for an insert or update, built before entering the
/// connection thread.
pub struct ChronicleParams {
  pub uuid:       String,
  pub title:      String,
  pub subtitle:   String,
  pub content:    String,
  pub entry_type: &'static str,
  pub cover_ref:  Option<String>,
  pub cover_blob: Option<Bytes>,
  pub audio_ref:  Option<String>,
  pub audio_blob: Option<Bytes>,
  pub tags:       String,
  pub created_at: String,
  pub updated_at: String,
  pub status:     &'static str,
}

impl ChronicleParams {
  pub fn from_chronicle(c: &Chronicle) -> Result<Self> {
    let (cover_ref, cover_blob) = encode_attachment(&c.cover_image);
    let (audio_ref, audio_blob) = encode_attachment(&c.audio_file);
    Ok(Self {
      uuid: encode_uuid(c.uuid),
      title: c.title.clone(),
      subtitle: c.subtitle.clone(),
      content: c.content.clone(),
      entry_type: c.entry_type.into(),
      cover_ref,
      cover_blob,
      audio_ref,
      audio_blob,
      tags: encode_tags(&c.tags)?,
      created_at: encode_dt(c.created_at),
      updated_at: encode_dt(c.updated_at),
      status: c.status.into(),
    })
  }
}
