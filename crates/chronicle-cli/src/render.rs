//! Plain-text and JSON renderings of chronicles for stdout.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};
use chronicle_archive::GroupedChronicles;
use chronicle_core::{
  attachment::Attachment,
  chronicle::{Chronicle, ChronicleId, EntryType, Status},
};
use serde::Serialize;
use uuid::Uuid;

fn date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String
where
  Tz::Offset: std::fmt::Display,
{
  instant.with_timezone(tz).format("%Y-%m-%d").to_string()
}

fn id_of(c: &Chronicle) -> String {
  c.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_owned())
}

/// One line per chronicle: id, local date, type, title.
pub fn line<Tz: TimeZone>(c: &Chronicle, tz: &Tz) -> String
where
  Tz::Offset: std::fmt::Display,
{
  format!(
    "{:>5}  {}  {:<9}  {}",
    id_of(c),
    date(c.created_at, tz),
    c.entry_type.as_ref(),
    c.title,
  )
}

fn describe(attachment: &Attachment) -> Option<String> {
  match attachment {
    Attachment::Absent => None,
    Attachment::Reference(r) => Some(r.clone()),
    Attachment::Payload(p) => Some(format!("embedded, {} bytes", p.len())),
  }
}

/// Full record, header fields first and content last.
pub fn detail<Tz: TimeZone>(c: &Chronicle, tz: &Tz) -> String
where
  Tz::Offset: std::fmt::Display,
{
  let mut out = String::new();
  let _ = writeln!(out, "{}", c.title);
  if !c.subtitle.is_empty() {
    let _ = writeln!(out, "{}", c.subtitle);
  }
  let _ = writeln!(out);
  let _ = writeln!(out, "id:       {}", id_of(c));
  let _ = writeln!(out, "uuid:     {}", c.uuid);
  let _ = writeln!(out, "type:     {}", c.entry_type);
  let _ = writeln!(out, "status:   {}", c.status);
  let _ = writeln!(
    out,
    "created:  {}",
    c.created_at.with_timezone(tz).format("%Y-%m-%d %H:%M")
  );
  let _ = writeln!(
    out,
    "updated:  {}",
    c.updated_at.with_timezone(tz).format("%Y-%m-%d %H:%M")
  );
  if !c.tags.is_empty() {
    let tags: Vec<&str> = c.tags.iter().map(String::as_str).collect();
    let _ = writeln!(out, "tags:     {}", tags.join(", "));
  }
  if let Some(cover) = describe(&c.cover_image) {
    let _ = writeln!(out, "cover:    {cover}");
  }
  if let Some(audio) = describe(&c.audio_file) {
    let _ = writeln!(out, "audio:    {audio}");
  }
  if !c.content.is_empty() {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", c.content);
  }
  out
}

/// Year headings with per-year Roman ordinals, followed by the match count.
pub fn grouped<Tz: TimeZone>(result: &GroupedChronicles, tz: &Tz) -> String
where
  Tz::Offset: std::fmt::Display,
{
  let mut out = String::new();
  for group in &result.groups {
    let _ = writeln!(out, "{}", group.year);
    for entry in &group.entries {
      let c = &entry.chronicle;
      let _ = write!(out, "  {:>6}. {}", entry.ordinal, c.title);
      if !c.subtitle.is_empty() {
        let _ = write!(out, " ({})", c.subtitle);
      }
      let _ = writeln!(out, "  [{}, {}, #{}]", c.entry_type, date(c.created_at, tz), id_of(c));
    }
    let _ = writeln!(out);
  }
  let noun = if result.matched == 1 { "chronicle" } else { "chronicles" };
  let _ = writeln!(out, "{} {noun}", result.matched);
  out
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// A chronicle as written to a JSON backup. Embedded payloads are not
/// exported; they appear as a fixed placeholder.
#[derive(Debug, Serialize)]
pub struct ExportEntry {
  pub id:          Option<ChronicleId>,
  pub uuid:        Uuid,
  pub title:       String,
  pub subtitle:    String,
  pub content:     String,
  pub entry_type:  EntryType,
  pub cover_image: Option<String>,
  pub audio_file:  Option<String>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub status:      Status,
}

fn placeholder(attachment: &Attachment, label: &str) -> Option<String> {
  match attachment {
    Attachment::Absent => None,
    Attachment::Reference(r) => Some(r.clone()),
    Attachment::Payload(_) => Some(label.to_owned()),
  }
}

impl From<&Chronicle> for ExportEntry {
  fn from(c: &Chronicle) -> Self {
    Self {
      id:          c.id,
      uuid:        c.uuid,
      title:       c.title.clone(),
      subtitle:    c.subtitle.clone(),
      content:     c.content.clone(),
      entry_type:  c.entry_type,
      cover_image: placeholder(&c.cover_image, "[image]"),
      audio_file:  placeholder(&c.audio_file, "[audio]"),
      tags:        c.tags.as_slice().to_vec(),
      created_at:  c.created_at,
      updated_at:  c.updated_at,
      status:      c.status,
    }
  }
}

/// Pretty-printed JSON array of every record given.
pub fn export(records: &[Chronicle]) -> serde_json::Result<String> {
  let entries: Vec<ExportEntry> = records.iter().map(ExportEntry::from).collect();
  serde_json::to_string_pretty(&entries)
}
