//! Chronicle — the archived entry and the partial used to create one.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{attachment::Attachment, tags::Tags};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identity. Never reused once assigned.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChronicleId(pub i64);

impl fmt::Display for ChronicleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// What kind of writing an entry is.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::IntoStaticStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryType {
  #[default]
  Chronicle,
  Article,
  Idea,
  Thought,
}

impl EntryType {
  /// Decode a stored value. Missing or unrecognised values read as
  /// [`EntryType::Chronicle`]; this is the only place that default lives.
  pub fn from_stored(value: Option<&str>) -> Self {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
  }
}

/// Publication state of an entry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  #[default]
  Draft,
  Published,
  Private,
}

// ─── Chronicle ───────────────────────────────────────────────────────────────

/// A single archived entry.
///
/// `content` is a markup string the archive never interprets beyond stripping
/// tags for search.
#[derive(Debug, Clone, PartialEq)]
pub struct Chronicle {
  /// Absent until the record is first committed to a store.
  pub id:          Option<ChronicleId>,
  /// Client-assigned portable key; generated once at creation.
  pub uuid:        Uuid,
  pub title:       String,
  pub subtitle:    String,
  pub content:     String,
  pub entry_type:  EntryType,
  pub cover_image: Attachment,
  pub audio_file:  Attachment,
  pub tags:        Tags,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub status:      Status,
}

impl Chronicle {
  /// Refresh `updated_at`, guaranteeing it moves strictly forward even if the
  /// clock has not.
  pub fn restamp(&mut self, now: DateTime<Utc>) {
    self.updated_at = if now > self.updated_at {
      now
    } else {
      self.updated_at + Duration::nanoseconds(1)
    };
  }
}

// ─── NewChronicle ────────────────────────────────────────────────────────────

/// Input to archive creation. Every omitted field receives its default when
/// the archive materialises the record.
#[derive(Debug, Clone, Default)]
pub struct NewChronicle {
  pub title:       Option<String>,
  pub subtitle:    Option<String>,
  pub content:     Option<String>,
  pub entry_type:  Option<EntryType>,
  pub cover_image: Attachment,
  pub audio_file:  Attachment,
  pub tags:        Vec<String>,
  /// Falls back to the archive's configured default status.
  pub status:      Option<Status>,
  /// Back-dated creation time for imported entries. Defaults to now.
  pub created_at:  Option<DateTime<Utc>>,
}

impl NewChronicle {
  /// Convenience constructor with only a title set.
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: Some(title.into()), ..Self::default() }
  }
}
