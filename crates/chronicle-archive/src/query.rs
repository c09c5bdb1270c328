//! Filter composition and year grouping.
//!
//! Filters are applied in a fixed order (type, free text, year), each step
//! only narrowing the newest-first sequence produced by the previous one.
//! Grouping never reorders records within a year.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chronicle_core::chronicle::{Chronicle, ChronicleId, EntryType};

use crate::roman::to_roman;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Criteria for [`crate::Archive::search`]. Every field is optional; an
/// all-empty filter returns the whole archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChronicleFilter {
  /// Exact match on entry type.
  pub entry_type: Option<EntryType>,
  /// Calendar year of `created_at` in the archive's time zone.
  pub year:       Option<i32>,
  /// Free text; blank is treated as absent.
  pub query:      Option<String>,
}

impl ChronicleFilter {
  /// The query text, trimmed, if there is any.
  pub fn text(&self) -> Option<&str> {
    self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
  }

  /// Whether any criterion is set. Callers use this to tell "nothing matches"
  /// apart from "nothing exists".
  pub fn is_active(&self) -> bool {
    self.entry_type.is_some() || self.year.is_some() || self.text().is_some()
  }
}

// ─── Calendar spans ──────────────────────────────────────────────────────────

/// A half-open `[start, end)` interval of local calendar time, in UTC.
///
/// A year span covers `Jan 1 00:00:00` through the whole of `Dec 31
/// 23:59:59` local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSpan {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl CalendarSpan {
  pub fn year<Tz: TimeZone>(year: i32, tz: &Tz) -> Option<Self> {
    Self::between(
      NaiveDate::from_ymd_opt(year, 1, 1)?,
      NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?,
      tz,
    )
  }

  /// `month` is 1-based.
  pub fn month<Tz: TimeZone>(year: i32, month: u32, tz: &Tz) -> Option<Self> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
      NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
      NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Self::between(first, next, tz)
  }

  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant < self.end
  }

  fn between<Tz: TimeZone>(
    first: NaiveDate,
    next: NaiveDate,
    tz: &Tz,
  ) -> Option<Self> {
    Some(Self {
      start: start_of_day(first, tz)?,
      end:   start_of_day(next, tz)?,
    })
  }
}

/// The first instant of `date` in `tz`. Where a transition skips midnight the
/// day starts at the first valid hour.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
  (0..3)
    .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
    .find_map(|local| tz.from_local_datetime(&local).earliest())
    .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar year of an instant in `tz`.
pub fn year_of<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> i32 {
  instant.with_timezone(tz).year()
}

// ─── Narrowing ───────────────────────────────────────────────────────────────

/// Apply `filter` to newest-first `records`, preserving their order.
///
/// `text_matches` is the index's match set for the filter's query; pass
/// `Some` exactly when [`ChronicleFilter::text`] is `Some`.
pub fn narrow<Tz: TimeZone>(
  mut records: Vec<Chronicle>,
  filter: &ChronicleFilter,
  text_matches: Option<&HashSet<ChronicleId>>,
  tz: &Tz,
) -> Vec<Chronicle> {
  if let Some(entry_type) = filter.entry_type {
    records.retain(|c| c.entry_type == entry_type);
  }

  if let Some(ids) = text_matches {
    records.retain(|c| c.id.is_some_and(|id| ids.contains(&id)));
  }

  if let Some(year) = filter.year {
    match CalendarSpan::year(year, tz) {
      Some(span) => records.retain(|c| span.contains(c.created_at)),
      None => records.clear(),
    }
  }

  records
}

// ─── Grouping ────────────────────────────────────────────────────────────────

/// A chronicle with its display position inside its year.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedChronicle {
  /// Counts down from the group size (newest) to 1 (oldest).
  pub number:    usize,
  /// `number` as a Roman numeral.
  pub ordinal:   String,
  pub chronicle: Chronicle,
}

/// Every matching chronicle created in one calendar year, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
  pub year:    i32,
  pub entries: Vec<NumberedChronicle>,
}

/// The result of a filtered search: year groups, newest year first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedChronicles {
  /// Number of chronicles that survived every filter.
  pub matched: usize,
  pub groups:  Vec<YearGroup>,
}

impl GroupedChronicles {
  pub fn is_empty(&self) -> bool { self.matched == 0 }

  /// All chronicles in display order.
  pub fn chronicles(&self) -> impl Iterator<Item = &Chronicle> {
    self
      .groups
      .iter()
      .flat_map(|g| g.entries.iter().map(|e| &e.chronicle))
  }
}

/// Group newest-first `records` by the calendar year of `created_at`.
pub fn group_by_year<Tz: TimeZone>(
  records: Vec<Chronicle>,
  tz: &Tz,
) -> GroupedChronicles {
  let matched = records.len();

  let mut by_year: BTreeMap<i32, Vec<Chronicle>> = BTreeMap::new();
  for chronicle in records {
    by_year
      .entry(year_of(chronicle.created_at, tz))
      .or_default()
      .push(chronicle);
  }

  let groups = by_year
    .into_iter()
    .rev()
    .map(|(year, entries)| {
      let size = entries.len();
      let entries = entries
        .into_iter()
        .enumerate()
        .map(|(idx, chronicle)| NumberedChronicle {
          number: size - idx,
          ordinal: to_roman(size - idx),
          chronicle,
        })
        .collect();
      YearGroup { year, entries }
    })
    .collect();

  GroupedChronicles { matched, groups }
}

/// Distinct calendar years among `records`, newest first.
pub fn distinct_years<Tz: TimeZone>(records: &[Chronicle], tz: &Tz) -> Vec<i32> {
  records
    .iter()
    .map(|c| year_of(c.created_at, tz))
    .collect::<BTreeSet<_>>()
    .into_iter()
    .rev()
    .collect()
}
