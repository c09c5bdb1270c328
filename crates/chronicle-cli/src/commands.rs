//! Subcommand definitions and their handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use chrono::{DateTime, Local, Utc};
use chronicle_archive::{Archive, ChronicleFilter};
use chronicle_core::{
  attachment::{Attachment, Payload},
  chronicle::{ChronicleId, EntryType, NewChronicle, Status},
  store::ChronicleStore,
};
use clap::{Args, Subcommand};

use crate::render;

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Write a new chronicle.
  New(NewArgs),
  /// Change fields of an existing chronicle.
  Edit(EditArgs),
  /// Delete a chronicle.
  Rm { id: i64 },
  /// Print one chronicle in full.
  Show { id: i64 },
  /// List chronicles, newest first.
  List(Narrowing),
  /// Filter by text, type and year; print the result grouped by year.
  Search {
    query: Option<String>,
    #[command(flatten)]
    narrowing: Narrowing,
  },
  /// Years that have at least one chronicle.
  Years,
  /// Chronicles written in one calendar month.
  Month { year: i32, month: u32 },
  /// Rebuild the search index from the store.
  Reindex,
  /// Compare the search index against the store.
  Check,
  /// Write a JSON backup of every chronicle.
  Export {
    /// Destination file; stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
}

#[derive(Args, Debug)]
pub struct Narrowing {
  #[arg(long = "type", value_name = "TYPE")]
  entry_type: Option<EntryType>,
  #[arg(long)]
  year:       Option<i32>,
}

#[derive(Args, Debug)]
pub struct NewArgs {
  #[arg(long)]
  title:      Option<String>,
  #[arg(long)]
  subtitle:   Option<String>,
  /// Content markup.
  #[arg(long, conflicts_with = "content_file")]
  content:    Option<String>,
  /// Read content markup from a file.
  #[arg(long, value_name = "FILE")]
  content_file: Option<PathBuf>,
  #[arg(long = "type", value_name = "TYPE")]
  entry_type: Option<EntryType>,
  #[arg(long)]
  status:     Option<Status>,
  #[arg(long = "tag", value_name = "TAG")]
  tags:       Vec<String>,
  /// Backdate the entry (RFC 3339), e.g. when importing.
  #[arg(long, value_name = "TIME")]
  at:         Option<DateTime<Utc>>,
  #[command(flatten)]
  media:      MediaArgs,
}

#[derive(Args, Debug)]
pub struct EditArgs {
  id:           i64,
  #[arg(long)]
  title:        Option<String>,
  #[arg(long)]
  subtitle:     Option<String>,
  #[arg(long, conflicts_with = "content_file")]
  content:      Option<String>,
  #[arg(long, value_name = "FILE")]
  content_file: Option<PathBuf>,
  #[arg(long = "type", value_name = "TYPE")]
  entry_type:   Option<EntryType>,
  #[arg(long)]
  status:       Option<Status>,
  #[arg(long = "add-tag", value_name = "TAG")]
  add_tags:     Vec<String>,
  #[arg(long = "remove-tag", value_name = "TAG")]
  remove_tags:  Vec<String>,
  #[arg(long, conflicts_with_all = ["cover", "cover_ref"])]
  no_cover:     bool,
  #[arg(long, conflicts_with_all = ["audio", "audio_ref"])]
  no_audio:     bool,
  #[command(flatten)]
  media:        MediaArgs,
}

/// Cover and audio, either embedded from a file or stored by reference.
#[derive(Args, Debug)]
pub struct MediaArgs {
  /// Cover image file to embed.
  #[arg(long, value_name = "FILE", conflicts_with = "cover_ref")]
  cover:     Option<PathBuf>,
  /// Cover image kept elsewhere (URL or path).
  #[arg(long, value_name = "REF")]
  cover_ref: Option<String>,
  /// Audio file to embed.
  #[arg(long, value_name = "FILE", conflicts_with = "audio_ref")]
  audio:     Option<PathBuf>,
  /// Audio kept elsewhere (URL or path).
  #[arg(long, value_name = "REF")]
  audio_ref: Option<String>,
}

impl MediaArgs {
  async fn cover(&self) -> anyhow::Result<Option<Attachment>> {
    attachment(self.cover.as_deref(), self.cover_ref.as_deref()).await
  }

  async fn audio(&self) -> anyhow::Result<Option<Attachment>> {
    attachment(self.audio.as_deref(), self.audio_ref.as_deref()).await
  }
}

async fn attachment(
  file: Option<&Path>,
  reference: Option<&str>,
) -> anyhow::Result<Option<Attachment>> {
  if let Some(path) = file {
    let bytes = tokio::fs::read(path)
      .await
      .with_context(|| format!("failed to read {}", path.display()))?;
    return Ok(Some(Attachment::Payload(Payload::new(bytes))));
  }
  Ok(reference.map(|r| Attachment::Reference(r.to_owned())))
}

async fn content(
  inline: Option<String>,
  file: Option<&Path>,
) -> anyhow::Result<Option<String>> {
  match file {
    Some(path) => tokio::fs::read_to_string(path)
      .await
      .map(Some)
      .with_context(|| format!("failed to read {}", path.display())),
    None => Ok(inline),
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run<S: ChronicleStore>(
  archive: &Archive<S>,
  command: Command,
) -> anyhow::Result<()> {
  match command {
    Command::New(args) => new(archive, args).await,
    Command::Edit(args) => edit(archive, args).await,
    Command::Rm { id } => {
      archive
        .delete(ChronicleId(id))
        .await
        .with_context(|| format!("failed to delete chronicle {id}"))?;
      println!("Deleted {id}.");
      Ok(())
    }
    Command::Show { id } => {
      let Some(chronicle) = archive.get(ChronicleId(id)).await? else {
        bail!("no chronicle with id {id}");
      };
      print!("{}", render::detail(&chronicle, &Local));
      Ok(())
    }
    Command::List(Narrowing { entry_type, year }) => {
      for chronicle in archive.list(entry_type, year).await? {
        println!("{}", render::line(&chronicle, &Local));
      }
      Ok(())
    }
    Command::Search { query, narrowing } => {
      let filter = ChronicleFilter {
        entry_type: narrowing.entry_type,
        year:       narrowing.year,
        query,
      };
      let result = archive.search(&filter).await?;
      if !result.is_empty() {
        print!("{}", render::grouped(&result, &Local));
      } else if filter.is_active() {
        println!("No chronicles match.");
      } else {
        println!("The archive is empty.");
      }
      Ok(())
    }
    Command::Years => {
      for year in archive.available_years().await? {
        println!("{year}");
      }
      Ok(())
    }
    Command::Month { year, month } => {
      if !(1..=12).contains(&month) {
        bail!("month must be between 1 and 12, got {month}");
      }
      for chronicle in archive.list_month(year, month).await? {
        println!("{}", render::line(&chronicle, &Local));
      }
      Ok(())
    }
    Command::Reindex => {
      let count = archive.rebuild_index().await?;
      println!("Indexed {count} chronicles.");
      Ok(())
    }
    Command::Check => check(archive).await,
    Command::Export { out } => export(archive, out.as_deref()).await,
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn new<S: ChronicleStore>(
  archive: &Archive<S>,
  args: NewArgs,
) -> anyhow::Result<()> {
  let new = NewChronicle {
    title:       args.title,
    subtitle:    args.subtitle,
    content:     content(args.content, args.content_file.as_deref()).await?,
    entry_type:  args.entry_type,
    cover_image: args.media.cover().await?.unwrap_or_default(),
    audio_file:  args.media.audio().await?.unwrap_or_default(),
    tags:        args.tags,
    status:      args.status,
    created_at:  args.at,
  };

  let chronicle = archive.create(new).await?;
  println!("{}", render::line(&chronicle, &Local));
  Ok(())
}

async fn edit<S: ChronicleStore>(
  archive: &Archive<S>,
  args: EditArgs,
) -> anyhow::Result<()> {
  let Some(mut chronicle) = archive.get(ChronicleId(args.id)).await? else {
    bail!("no chronicle with id {}", args.id);
  };

  if let Some(title) = args.title {
    chronicle.title = title;
  }
  if let Some(subtitle) = args.subtitle {
    chronicle.subtitle = subtitle;
  }
  if let Some(content) = content(args.content, args.content_file.as_deref()).await? {
    chronicle.content = content;
  }
  if let Some(entry_type) = args.entry_type {
    chronicle.entry_type = entry_type;
  }
  if let Some(status) = args.status {
    chronicle.status = status;
  }
  for tag in &args.remove_tags {
    chronicle.tags.remove(tag);
  }
  for tag in args.add_tags {
    chronicle.tags.insert(tag);
  }

  if args.no_cover {
    chronicle.cover_image = Attachment::Absent;
  } else if let Some(cover) = args.media.cover().await? {
    chronicle.cover_image = cover;
  }
  if args.no_audio {
    chronicle.audio_file = Attachment::Absent;
  } else if let Some(audio) = args.media.audio().await? {
    chronicle.audio_file = audio;
  }

  let chronicle = archive.update(chronicle).await?;
  println!("{}", render::line(&chronicle, &Local));
  Ok(())
}

async fn check<S: ChronicleStore>(archive: &Archive<S>) -> anyhow::Result<()> {
  let audit = archive.audit_index().await?;
  if audit.is_consistent() {
    println!("Search index agrees with the store.");
    return Ok(());
  }
  for id in &audit.missing {
    println!("not indexed: {id}");
  }
  for id in &audit.orphaned {
    println!("indexed but not stored: {id}");
  }
  bail!("search index is out of date; run `chronicle reindex`")
}

async fn export<S: ChronicleStore>(
  archive: &Archive<S>,
  out: Option<&Path>,
) -> anyhow::Result<()> {
  let records = archive.list(None, None).await?;
  let json = render::export(&records).context("failed to serialise backup")?;

  match out {
    Some(path) => {
      tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
      tracing::info!(count = records.len(), path = %path.display(), "exported chronicles");
    }
    None => println!("{json}"),
  }
  Ok(())
}
