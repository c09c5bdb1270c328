//! Facade tests against an in-memory SQLite store, in UTC.

use chrono::{DateTime, TimeZone, Utc};
use chronicle_core::{
  attachment::{Attachment, Payload},
  chronicle::{ChronicleId, EntryType, NewChronicle, Status},
  store::{ChronicleStore, SortDirection},
  Error,
};
use chronicle_store_sqlite::SqliteStore;

use crate::{Archive, ArchiveConfig, ChronicleFilter};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn archive_on(store: SqliteStore, config: ArchiveConfig) -> Archive<SqliteStore, Utc> {
  Archive::open_with_timezone(store, config, Utc)
    .await
    .expect("archive")
}

async fn archive() -> Archive<SqliteStore, Utc> {
  archive_on(store().await, ArchiveConfig::default()).await
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn dated(title: &str, created_at: DateTime<Utc>) -> NewChronicle {
  NewChronicle { created_at: Some(created_at), ..NewChronicle::new(title) }
}

fn text(q: &str) -> ChronicleFilter {
  ChronicleFilter { query: Some(q.into()), ..Default::default() }
}

async fn assert_in_agreement(a: &Archive<SqliteStore, Utc>) {
  let audit = a.audit_index().await.unwrap();
  assert!(audit.is_consistent(), "index diverged: {audit:?}");
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_applies_defaults() {
  let a = archive().await;
  let c = a.create(NewChronicle::default()).await.unwrap();

  assert!(c.id.is_some());
  assert!(!c.uuid.is_nil());
  assert_eq!(c.title, "Untitled");
  assert_eq!(c.subtitle, "");
  assert_eq!(c.content, "");
  assert_eq!(c.entry_type, EntryType::Chronicle);
  assert_eq!(c.status, Status::Draft);
  assert!(c.tags.is_empty());
  assert!(c.cover_image.is_absent());
  assert_eq!(c.created_at, c.updated_at);

  let stored = a.get(c.id.unwrap()).await.unwrap().unwrap();
  assert_eq!(stored.uuid, c.uuid);
  assert_eq!(stored.title, "Untitled");
}

#[tokio::test]
async fn create_uses_configured_status_unless_given() {
  let config = ArchiveConfig { default_status: Status::Private, ..Default::default() };
  let a = archive_on(store().await, config).await;

  let quick = a.create(NewChronicle::new("quick")).await.unwrap();
  assert_eq!(quick.status, Status::Private);

  let explicit = a
    .create(NewChronicle { status: Some(Status::Published), ..NewChronicle::new("x") })
    .await
    .unwrap();
  assert_eq!(explicit.status, Status::Published);
}

#[tokio::test]
async fn create_deduplicates_tags() {
  let a = archive().await;
  let c = a
    .create(NewChronicle {
      tags: vec!["sea".into(), "sea".into(), "salt".into()],
      ..NewChronicle::new("Coast")
    })
    .await
    .unwrap();
  assert_eq!(c.tags.as_slice(), &["sea", "salt"]);
}

#[tokio::test]
async fn uuids_are_unique() {
  let a = archive().await;
  let one = a.create(NewChronicle::new("one")).await.unwrap();
  let two = a.create(NewChronicle::new("two")).await.unwrap();
  assert_ne!(one.uuid, two.uuid);
  assert_ne!(one.id, two.id);
}

#[tokio::test]
async fn attachments_pass_through() {
  let a = archive().await;
  let cover = Payload::new(vec![7u8; 16]);
  let c = a
    .create(NewChronicle {
      cover_image: Attachment::Payload(cover.clone()),
      audio_file: Attachment::Reference("audio/take1.webm".into()),
      ..NewChronicle::new("media")
    })
    .await
    .unwrap();

  // The returned record still holds the caller's handle.
  assert_eq!(c.cover_image.payload(), Some(&cover));

  let stored = a.get(c.id.unwrap()).await.unwrap().unwrap();
  assert_eq!(stored.cover_image.payload().unwrap().as_bytes(), &[7u8; 16]);
  assert_eq!(stored.audio_file.reference(), Some("audio/take1.webm"));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_preserves_identity() {
  let a = archive().await;
  let original = a.create(NewChronicle::new("Draft title")).await.unwrap();

  let mut edited = original.clone();
  edited.title = "Final title".into();
  let updated = a.update(edited).await.unwrap();

  assert_eq!(updated.id, original.id);
  assert_eq!(updated.uuid, original.uuid);
  assert_eq!(updated.created_at, original.created_at);
  assert!(updated.updated_at > original.updated_at);

  let stored = a.get(original.id.unwrap()).await.unwrap().unwrap();
  assert_eq!(stored.title, "Final title");
  assert_eq!(stored.updated_at, updated.updated_at);
}

#[tokio::test]
async fn update_cannot_reassign_uuid_or_creation_time() {
  let a = archive().await;
  let original = a.create(NewChronicle::new("keep me")).await.unwrap();

  let mut edited = original.clone();
  edited.title = "kept".into();
  edited.uuid = uuid::Uuid::new_v4();
  edited.created_at = utc(1999, 1, 1, 0, 0, 0);
  let updated = a.update(edited).await.unwrap();

  assert_eq!(updated.uuid, original.uuid);
  assert_eq!(updated.created_at, original.created_at);
  assert_eq!(updated.title, "kept");

  let stored = a.get(original.id.unwrap()).await.unwrap().unwrap();
  assert_eq!(stored.uuid, original.uuid);
  assert_eq!(stored.created_at, original.created_at);
  assert_eq!(stored.title, "kept");
  assert!(a.list(None, Some(1999)).await.unwrap().is_empty());
}

#[tokio::test]
async fn stale_copy_still_advances_updated_at() {
  let a = archive().await;
  let original = a.create(NewChronicle::new("twice")).await.unwrap();

  let first = a.update(original.clone()).await.unwrap();
  let second = a.update(original).await.unwrap();

  assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn update_reindexes() {
  let a = archive().await;
  let mut c = a.create(NewChronicle::new("Pelican")).await.unwrap();

  c.title = "Albatross".into();
  a.update(c).await.unwrap();

  assert!(a.search(&text("pelican")).await.unwrap().is_empty());
  assert_eq!(a.search(&text("albat")).await.unwrap().matched, 1);
}

#[tokio::test]
async fn update_without_identity_fails() {
  let a = archive().await;
  let mut c = a.create(NewChronicle::new("x")).await.unwrap();
  c.id = None;

  let err = a.update(c).await.unwrap_err();
  assert!(matches!(err, Error::MissingIdentity));
}

#[tokio::test]
async fn update_of_unknown_identity_is_invalid() {
  let a = archive().await;
  let mut c = a.create(NewChronicle::new("x")).await.unwrap();
  c.id = Some(ChronicleId(9_999));

  let err = a.update(c).await.unwrap_err();
  assert!(matches!(err, Error::InvalidRecord(ChronicleId(9_999))));
  assert_eq!(a.search(&text("x")).await.unwrap().matched, 1);
  assert_in_agreement(&a).await;
}

#[tokio::test]
async fn adding_an_existing_tag_is_a_no_op() {
  let a = archive().await;
  let mut c = a
    .create(NewChronicle { tags: vec!["rome".into()], ..NewChronicle::new("Trip") })
    .await
    .unwrap();

  assert!(!c.tags.insert("rome"));
  assert!(c.tags.insert("florence"));
  let updated = a.update(c).await.unwrap();
  assert_eq!(updated.tags.as_slice(), &["rome", "florence"]);

  let stored = a.get(updated.id.unwrap()).await.unwrap().unwrap();
  assert_eq!(stored.tags.len(), 2);
  assert_eq!(a.search(&text("flor")).await.unwrap().matched, 1);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deletion_clears_index() {
  let a = archive().await;
  let c = a.create(NewChronicle::new("Zanzibar notes")).await.unwrap();
  let id = c.id.unwrap();

  assert_eq!(a.search(&text("zanzibar")).await.unwrap().matched, 1);

  a.delete(id).await.unwrap();

  assert!(a.search(&text("zanzibar")).await.unwrap().is_empty());
  assert!(a.search_ids("zanzibar").unwrap().is_empty());
  assert!(a.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_unknown_identity_is_not_found() {
  let a = archive().await;
  a.create(NewChronicle::new("keeper")).await.unwrap();

  let err = a.delete(ChronicleId(42)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(ChronicleId(42))));
  assert_eq!(a.search(&text("keeper")).await.unwrap().matched, 1);
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
  let a = archive().await;
  let id = a.create(NewChronicle::new("once")).await.unwrap().id.unwrap();
  a.delete(id).await.unwrap();
  assert!(matches!(a.delete(id).await.unwrap_err(), Error::NotFound(_)));
}

// ─── Index/store agreement ───────────────────────────────────────────────────

#[tokio::test]
async fn index_agrees_with_store_after_every_operation() {
  let a = archive().await;
  assert_in_agreement(&a).await;

  let one = a.create(NewChronicle::new("one")).await.unwrap();
  assert_in_agreement(&a).await;
  let two = a.create(NewChronicle::new("two")).await.unwrap();
  assert_in_agreement(&a).await;
  let three = a.create(NewChronicle::new("three")).await.unwrap();
  assert_in_agreement(&a).await;

  let mut edited = two.clone();
  edited.content = "<p>changed</p>".into();
  a.update(edited).await.unwrap();
  assert_in_agreement(&a).await;

  a.delete(one.id.unwrap()).await.unwrap();
  assert_in_agreement(&a).await;
  let _ = a.delete(one.id.unwrap()).await;
  assert_in_agreement(&a).await;
  a.delete(three.id.unwrap()).await.unwrap();
  assert_in_agreement(&a).await;

  let stored: Vec<_> = a.list(None, None).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].id, two.id);
}

#[tokio::test]
async fn reindexing_is_idempotent() {
  let a = archive().await;
  let c = a.create(NewChronicle::new("Lighthouse keeper")).await.unwrap();
  let before = a.search_ids("light").unwrap();

  a.update(c.clone()).await.unwrap();
  a.update(c).await.unwrap();
  assert_eq!(a.search_ids("light").unwrap(), before);

  assert_eq!(a.rebuild_index().await.unwrap(), 1);
  assert_eq!(a.rebuild_index().await.unwrap(), 1);
  assert_eq!(a.search_ids("light").unwrap(), before);
  assert_in_agreement(&a).await;
}

#[tokio::test]
async fn opening_builds_index_from_existing_records() {
  let shared = store().await;
  {
    let first = archive_on(shared.clone(), ArchiveConfig::default()).await;
    first.create(NewChronicle::new("Persisted river")).await.unwrap();
  }

  let second = archive_on(shared, ArchiveConfig::default()).await;
  assert_eq!(second.search(&text("river")).await.unwrap().matched, 1);
  assert_in_agreement(&second).await;
}

#[tokio::test]
async fn audit_reports_records_written_behind_the_archive() {
  let shared = store().await;
  let a = archive_on(shared.clone(), ArchiveConfig::default()).await;
  a.create(NewChronicle::new("through the front door")).await.unwrap();

  // Written straight to the store, bypassing the facade.
  let mut sideways = a.create(NewChronicle::new("template")).await.unwrap();
  sideways.id = None;
  sideways.uuid = uuid::Uuid::new_v4();
  let hidden = shared.put(&sideways).await.unwrap();

  let audit = a.audit_index().await.unwrap();
  assert_eq!(audit.missing, [hidden]);
  assert!(audit.orphaned.is_empty());

  a.rebuild_index().await.unwrap();
  assert_in_agreement(&a).await;
}

// ─── Filtering and grouping ──────────────────────────────────────────────────

#[tokio::test]
async fn search_narrowing() {
  let a = archive().await;
  let long_march = a
    .create(NewChronicle {
      entry_type: Some(EntryType::Article),
      ..NewChronicle::new("The Long March")
    })
    .await
    .unwrap();
  a.create(NewChronicle::new("March of Time")).await.unwrap();

  let articles = a
    .search(&ChronicleFilter {
      entry_type: Some(EntryType::Article),
      query: Some("march".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(articles.matched, 1);
  assert_eq!(articles.chronicles().next().unwrap().id, long_march.id);

  assert_eq!(a.search(&text("march")).await.unwrap().matched, 2);
  assert!(a.search(&text("xyz123")).await.unwrap().groups.is_empty());
}

#[tokio::test]
async fn searchable_fields() {
  let a = archive().await;
  a.create(NewChronicle {
    subtitle: Some("a quiet harbour".into()),
    content: Some("<p>The <strong>tide</strong> came in</p>".into()),
    entry_type: Some(EntryType::Thought),
    tags: vec!["Lisbon".into()],
    ..NewChronicle::new("Morning")
  })
  .await
  .unwrap();

  for q in ["morn", "harb", "tide", "lisbon", "thought"] {
    assert_eq!(a.search(&text(q)).await.unwrap().matched, 1, "query {q:?}");
  }
  assert!(a.search(&text("strong")).await.unwrap().is_empty());
}

#[tokio::test]
async fn year_boundaries() {
  let a = archive().await;
  let last_second = a
    .create(dated("last", utc(2022, 12, 31, 23, 59, 59)))
    .await
    .unwrap();
  let first_second = a
    .create(dated("first", utc(2022, 1, 1, 0, 0, 0)))
    .await
    .unwrap();

  let in_2022: Vec<_> = a
    .list(None, Some(2022))
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.id)
    .collect();
  assert_eq!(in_2022, [last_second.id, first_second.id]);

  assert!(a.list(None, Some(2023)).await.unwrap().is_empty());
  assert!(a.list(None, Some(2021)).await.unwrap().is_empty());

  let grouped = a
    .search(&ChronicleFilter { year: Some(2022), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(grouped.groups.len(), 1);
  assert_eq!(grouped.groups[0].year, 2022);
}

#[tokio::test]
async fn groups_are_ordered_by_year_with_countdown_ordinals() {
  let a = archive().await;
  a.create(dated("a", utc(2021, 4, 1, 9, 0, 0))).await.unwrap();
  let early = a.create(dated("b", utc(2023, 2, 1, 9, 0, 0))).await.unwrap();
  a.create(dated("c", utc(2022, 8, 1, 9, 0, 0))).await.unwrap();
  let late = a.create(dated("d", utc(2023, 10, 1, 9, 0, 0))).await.unwrap();

  let grouped = a.search(&ChronicleFilter::default()).await.unwrap();
  assert_eq!(grouped.matched, 4);

  let years: Vec<_> = grouped.groups.iter().map(|g| g.year).collect();
  assert_eq!(years, [2023, 2022, 2021]);

  let newest = &grouped.groups[0];
  assert_eq!(newest.entries.len(), 2);
  assert_eq!(newest.entries[0].chronicle.id, late.id);
  assert_eq!(newest.entries[0].ordinal, "II");
  assert_eq!(newest.entries[1].chronicle.id, early.id);
  assert_eq!(newest.entries[1].ordinal, "I");
  assert_eq!(grouped.groups[2].entries[0].ordinal, "I");
}

#[tokio::test]
async fn year_groups_follow_the_archive_time_zone() {
  let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
  let a = Archive::open_with_timezone(store().await, ArchiveConfig::default(), plus_two)
    .await
    .unwrap();

  // 23:30 UTC on Dec 31 is already New Year at +02:00.
  a.create(dated("fireworks", utc(2022, 12, 31, 23, 30, 0)))
    .await
    .unwrap();

  assert_eq!(a.available_years().await.unwrap(), [2023]);
  assert_eq!(a.list(None, Some(2023)).await.unwrap().len(), 1);
  assert!(a.list(None, Some(2022)).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_results_have_no_groups() {
  let a = archive().await;

  let everything = ChronicleFilter::default();
  let nothing_yet = a.search(&everything).await.unwrap();
  assert!(nothing_yet.groups.is_empty());
  assert!(!everything.is_active());

  a.create(NewChronicle::new("solitary")).await.unwrap();
  let no_match = text("absent");
  let result = a.search(&no_match).await.unwrap();
  assert!(result.groups.is_empty());
  assert!(no_match.is_active());
}

#[tokio::test]
async fn blank_query_does_not_filter() {
  let a = archive().await;
  a.create(NewChronicle::new("one")).await.unwrap();
  a.create(NewChronicle::new("two")).await.unwrap();
  assert_eq!(a.search(&text("   ")).await.unwrap().matched, 2);
}

#[tokio::test]
async fn list_filters_by_type_and_year_newest_first() {
  let a = archive().await;
  let idea_old = a
    .create(NewChronicle {
      entry_type: Some(EntryType::Idea),
      ..dated("idea old", utc(2020, 5, 5, 0, 0, 0))
    })
    .await
    .unwrap();
  let idea_new = a
    .create(NewChronicle {
      entry_type: Some(EntryType::Idea),
      ..dated("idea new", utc(2021, 5, 5, 0, 0, 0))
    })
    .await
    .unwrap();
  a.create(dated("chronicle", utc(2021, 6, 6, 0, 0, 0))).await.unwrap();

  let ideas: Vec<_> = a
    .list(Some(EntryType::Idea), None)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.id)
    .collect();
  assert_eq!(ideas, [idea_new.id, idea_old.id]);

  let ideas_2020 = a.list(Some(EntryType::Idea), Some(2020)).await.unwrap();
  assert_eq!(ideas_2020.len(), 1);
  assert_eq!(ideas_2020[0].id, idea_old.id);

  assert_eq!(a.list(None, None).await.unwrap().len(), 3);
}

// ─── Supplementary reads ─────────────────────────────────────────────────────

#[tokio::test]
async fn available_years_are_distinct_and_descending() {
  let a = archive().await;
  for (title, y) in [("a", 2019), ("b", 2024), ("c", 2019), ("d", 2021)] {
    a.create(dated(title, utc(y, 3, 3, 3, 3, 3))).await.unwrap();
  }
  assert_eq!(a.available_years().await.unwrap(), [2024, 2021, 2019]);
}

#[tokio::test]
async fn list_month_selects_one_calendar_month() {
  let a = archive().await;
  a.create(dated("jan", utc(2024, 1, 31, 23, 59, 59))).await.unwrap();
  let early = a.create(dated("feb 1", utc(2024, 2, 1, 0, 0, 0))).await.unwrap();
  let late = a.create(dated("feb 29", utc(2024, 2, 29, 23, 59, 59))).await.unwrap();
  a.create(dated("mar", utc(2024, 3, 1, 0, 0, 0))).await.unwrap();

  let feb: Vec<_> = a
    .list_month(2024, 2)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.id)
    .collect();
  assert_eq!(feb, [late.id, early.id]);

  assert!(a.list_month(2024, 0).await.unwrap().is_empty());
  assert!(a.list_month(2024, 13).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_ids_are_ranked_and_limited() {
  let config = ArchiveConfig { search_limit: 2, ..Default::default() };
  let a = archive_on(store().await, config).await;

  let buried = a
    .create(NewChronicle {
      content: Some("<p>much later a comet appears</p>".into()),
      ..NewChronicle::new("Night sky")
    })
    .await
    .unwrap();
  let first = a.create(NewChronicle::new("Comet one")).await.unwrap();
  let second = a.create(NewChronicle::new("Comet two")).await.unwrap();

  let ids = a.search_ids("comet").unwrap();
  assert_eq!(ids, [second.id.unwrap(), first.id.unwrap()]);
  assert!(!ids.contains(&buried.id.unwrap()));

  // The membership filter is never truncated by the ranking limit.
  assert_eq!(a.search(&text("comet")).await.unwrap().matched, 3);
}

#[tokio::test]
async fn store_order_is_the_result_order() {
  let a = archive().await;
  let newest = a.create(dated("river delta", utc(2024, 9, 1, 0, 0, 0))).await.unwrap();
  let oldest = a.create(dated("river", utc(2020, 9, 1, 0, 0, 0))).await.unwrap();

  // Equal match positions rank the most recently indexed first, which here
  // is the oldest record; grouped results stay newest-first.
  let ranked = a.search_ids("river").unwrap();
  assert_eq!(ranked, [oldest.id.unwrap(), newest.id.unwrap()]);

  let order: Vec<_> = a
    .search(&text("river"))
    .await
    .unwrap()
    .chronicles()
    .map(|c| c.id)
    .collect();
  assert_eq!(order, [newest.id, oldest.id]);

  let all = a.list(None, None).await.unwrap();
  let store_order = store_ids(&all);
  assert_eq!(store_order, [newest.id, oldest.id]);
}

fn store_ids(records: &[chronicle_core::chronicle::Chronicle]) -> Vec<Option<ChronicleId>> {
  records.iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn raw_store_stays_newest_first() {
  let s = store().await;
  let a = archive_on(s.clone(), ArchiveConfig::default()).await;
  a.create(dated("older", utc(2020, 1, 1, 0, 0, 0))).await.unwrap();
  a.create(dated("newer", utc(2021, 1, 1, 0, 0, 0))).await.unwrap();

  let titles: Vec<_> = s
    .list_all(SortDirection::Descending)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.title)
    .collect();
  assert_eq!(titles, ["newer", "older"]);
}
